//! Free-text cleanup applied before anything reaches the spreadsheet.
//!
//! This only neutralizes angle brackets, it is not HTML escaping.

pub const MAX_TEXT_LEN: usize = 500;

/// Strip `<` and `>`, trim and cap at `MAX_TEXT_LEN` characters.
///
/// The output is always trimmed so `clean(clean(x)) == clean(x)`.
pub fn clean(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let truncated: String = stripped.trim().chars().take(MAX_TEXT_LEN).collect();
    truncated.trim().to_string()
}

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::calendar::export;

/// Write the calendar file for the selected events into `out_dir`.
pub fn run(civil: bool, lunch: bool, out_dir: PathBuf) -> Result<PathBuf> {
    let file = export(civil, lunch, chrono::Utc::now())?;
    let path = out_dir.join(file.file_name);
    std::fs::write(&path, file.content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(path)
}

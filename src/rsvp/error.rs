use thiserror::Error;

#[derive(Error, Debug)]
pub enum RsvpError {
    #[error("Invalid submission: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Too many requests")]
    RateLimited,

    #[error("Spreadsheet endpoint is not configured")]
    Configuration,

    #[error("Spreadsheet service error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

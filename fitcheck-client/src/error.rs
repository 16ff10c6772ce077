use thiserror::Error;

/// Every way a submission can fail. Callers treat all variants as the same
/// request failure; the distinction only exists for diagnostics.
#[derive(Error, Debug)]
pub enum AssessError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook responded with status {0}")]
    Status(u16),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

pub type Result<T> = std::result::Result<T, AssessError>;

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("task tracker unreachable: {0}")]
    TrackerTransport(String),
    #[error("task tracker rejected the request with {status}: {body}")]
    TrackerRejected { status: u16, body: String },
    /// The tracker answered with success but the reply could not be understood.
    #[error("unexpected task tracker response: {0}")]
    TrackerResponse(String),
    #[error("invalid config file: {0}")]
    ConfigFormat(#[from] toml::de::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// Whether the caller may reasonably send the same submission again.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::TrackerTransport(_) => true,
            AppError::TrackerRejected { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

use crate::shared::error::AppError;
use thiserror::Error;

/// Failures local to the HTTP adapter, folded into `AppError` at the
/// application boundary.
#[derive(Debug, Error)]
pub enum RemoteServiceError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered but flagged the request as unsuccessful.
    #[error("Server rejected the request: {0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl From<RemoteServiceError> for AppError {
    fn from(err: RemoteServiceError) -> Self {
        match err {
            RemoteServiceError::NotFound(msg) => AppError::NotFound(msg),
            other => AppError::Network(other.to_string()),
        }
    }
}

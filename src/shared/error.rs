use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Database(String),
    Network(String),
    NotFound(String),
    ValidationError(String),
    SerializationError(String),
    ConfigurationError(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Stable machine-readable code for the UI layer.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::Network(_) => "network",
            AppError::NotFound(_) => "not_found",
            AppError::ValidationError(_) => "validation",
            AppError::SerializationError(_) => "serialization",
            AppError::ConfigurationError(_) => "configuration",
            AppError::Internal(_) => "internal",
        }
    }

    /// Single human-readable failure reason; raw transport errors are not
    /// forwarded to callers.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => "Local storage is unavailable".to_string(),
            AppError::Network(_) => "The server could not be reached".to_string(),
            AppError::NotFound(msg) => format!("Not found: {}", msg),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::SerializationError(_) => "Data could not be encoded".to_string(),
            AppError::ConfigurationError(msg) => format!("Configuration error: {}", msg),
            AppError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

use std::io;
use thiserror::Error;

/// Custom error type for the NetSentry application
#[derive(Error, Debug)]
pub enum SentryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Sampler error: {0}")]
    Sampler(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the NetSentry application
pub type Result<T> = std::result::Result<T, SentryError>;

impl SentryError {
    /// Create a runtime error
    pub fn runtime<S: Into<String>>(msg: S) -> Self {
        SentryError::Runtime(msg.into())
    }

    /// Create a sampler error
    pub fn sampler<S: Into<String>>(msg: S) -> Self {
        SentryError::Sampler(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        SentryError::PermissionDenied(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SentryError::Other(msg.into())
    }
}

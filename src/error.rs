//! Error types for httpmail.

use thiserror::Error;

/// Common error type for httpmail.
#[derive(Error, Debug)]
pub enum HttpMailError {
    /// Validation error for request input or configuration values.
    ///
    /// Raised when a mail is missing its sender or recipients after
    /// defaults have been applied.
    #[error("{0}")]
    Validation(String),

    /// SMTP transport error.
    ///
    /// Covers dial, TLS negotiation and every SMTP command. Errors from
    /// lettre are automatically converted.
    #[error("{0}")]
    Transport(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl HttpMailError {
    /// Whether the error was caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, HttpMailError::Validation(_))
    }

    /// Whether the error came from talking to the relay.
    pub fn is_transport(&self) -> bool {
        matches!(self, HttpMailError::Transport(_))
    }
}

// Conversion from lettre SMTP errors
impl From<lettre::transport::smtp::Error> for HttpMailError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        HttpMailError::Transport(e.to_string())
    }
}

/// Result type alias for httpmail operations.
pub type Result<T> = std::result::Result<T, HttpMailError>;

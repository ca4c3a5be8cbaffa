//! HTTP error responses for the relay endpoint.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::HttpMailError;

/// Body sent in place of relay error text when redaction is on.
pub const REDACTED_MESSAGE: &str = "failed to send mail";

/// Plain-text API error.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create a method not allowed error.
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Build from a crate error, hiding relay detail when `redact` is set.
    pub fn from_error(err: HttpMailError, redact: bool) -> Self {
        match err {
            HttpMailError::Transport(_) if redact => {
                tracing::warn!(error = %err, "Mail delivery failed");
                Self::bad_request(REDACTED_MESSAGE)
            }
            err => err.into(),
        }
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message sent in the response body.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "text/plain")],
            self.message,
        )
            .into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<HttpMailError> for ApiError {
    fn from(err: HttpMailError) -> Self {
        match &err {
            HttpMailError::Validation(msg) => ApiError::bad_request(msg.clone()),
            HttpMailError::Transport(msg) => {
                tracing::warn!("Mail delivery failed: {}", msg);
                ApiError::bad_request(msg.clone())
            }
            _ => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

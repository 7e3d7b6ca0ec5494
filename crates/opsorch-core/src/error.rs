//! Error types for the OpsOrch GitHub adapter.
//!
//! Every error carries a canonical code (see [`Error::code`]) that the bridge
//! reports to the host orchestrator.

use thiserror::Error;

/// Main error type for adapter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A required configuration key is missing or not a string
    #[error("{0} is required")]
    MissingField(String),

    /// Malformed request payload or identifier
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Upstream rejected the credentials (401)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Upstream denied access (403)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Upstream resource does not exist (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other upstream failure
    #[error("provider error: {0}")]
    Provider(String),

    /// Bridge received a method outside its dispatch table
    #[error("unknown method: {0}")]
    MethodNotFound(String),

    /// HTTP request could not be sent
    #[error("HTTP error: {0}")]
    Http(String),

    /// Upstream response could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Map a non-success upstream HTTP status to a canonical error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Error::Unauthorized("GitHub API authentication failed".to_string()),
            403 => Error::Forbidden("GitHub API access forbidden".to_string()),
            404 => Error::NotFound("GitHub resource not found".to_string()),
            422 => Error::BadRequest(format!("GitHub API validation error: {}", message)),
            _ => Error::Provider(format!("GitHub API error ({}): {}", status, message)),
        }
    }

    /// Canonical error code reported to the host.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingField(_) => "missing_field",
            Error::BadRequest(_) => "bad_request",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::NotFound(_) => "not_found",
            Error::MethodNotFound(_) => "method_not_found",
            Error::Provider(_)
            | Error::Http(_)
            | Error::InvalidData(_)
            | Error::Serialization(_) => "provider_error",
        }
    }

    /// Human-readable message without the code prefix.
    pub fn message(&self) -> String {
        match self {
            Error::MissingField(field) => format!("{} is required", field),
            Error::MethodNotFound(method) => format!("unknown method: {}", method),
            Error::BadRequest(msg)
            | Error::Unauthorized(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg)
            | Error::Provider(msg)
            | Error::Http(msg)
            | Error::InvalidData(msg) => msg.clone(),
            Error::Serialization(e) => e.to_string(),
        }
    }
}

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

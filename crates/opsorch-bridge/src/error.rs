//! Transport-level errors of the bridge loop.
//!
//! Adapter failures never surface here; they are answered on the wire.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid request: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid request: {0}")]
    Utf8(#[source] std::string::FromUtf8Error),

    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl BridgeError {
    /// Whether the error concerns a single unreadable request line.
    pub fn is_decode(&self) -> bool {
        matches!(self, BridgeError::Decode(_) | BridgeError::Utf8(_))
    }
}

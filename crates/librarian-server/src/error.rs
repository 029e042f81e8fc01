//! Server error types

use thiserror::Error;

/// Errors that end a serving session
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error on the transport
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode a response
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

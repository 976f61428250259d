//! Record-side error types
//!
//! Errors from envelope decoding, encoder setup and per-record encoding.

use thiserror::Error;

/// Errors while decoding an envelope chunk
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// A frame in the chunk is not a valid (tag, time, record) triple
    #[error("malformed envelope frame: {0}")]
    Frame(#[from] rmp_serde::decode::Error),
}

/// Errors while resolving the configured encoding at setup time
#[derive(Debug, Error)]
pub enum SetupError {
    /// The fixed-attribute selector listed no attribute names
    #[error("fixed-attribute encoding requires at least one attribute name")]
    EmptyAttributeList,

    /// The selector named a formatter that was never registered
    #[error("no formatter registered under '{0}'")]
    UnknownFormatter(String),
}

/// Errors while encoding a single record
#[derive(Debug, Error)]
pub enum EncodeError {
    /// JSON serialization failed
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// MessagePack serialization failed
    #[error("MessagePack encoding failed: {0}")]
    MessagePack(#[from] rmp_serde::encode::Error),

    /// A delegated formatter rejected the record
    #[error("formatter '{name}' failed: {message}")]
    Formatter { name: String, message: String },
}

impl EncodeError {
    /// Create a formatter error
    pub fn formatter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Formatter {
            name: name.into(),
            message: message.into(),
        }
    }
}

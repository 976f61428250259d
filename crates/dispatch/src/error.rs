//! Dispatch error types
//!
//! Only two kinds of failure ever reach the caller: a record that could
//! not be decoded or encoded, and a batch that could not be delivered.
//! Broker resolution and client construction problems are handled inside
//! the engine (logged, left for the next refresh) and never surface here.

use thiserror::Error;

use kite_broker::DeliveryError;
use kite_record::{EncodeError, EnvelopeError, SetupError};

/// A failed record group dispatch
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A chunk frame could not be decoded into an envelope
    #[error("envelope decode failed: {0}")]
    Envelope(#[from] EnvelopeError),

    /// A record could not be encoded
    #[error("record encoding failed: {0}")]
    Encode(#[from] EncodeError),

    /// A batch send failed after client-level retries
    #[error("batch delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Result type for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

/// A failed engine construction from configuration
#[derive(Debug, Error)]
pub enum BuildError {
    /// The configuration itself is invalid
    #[error(transparent)]
    Config(#[from] kite_config::ConfigError),

    /// The encoding selector could not be resolved
    #[error(transparent)]
    Encoder(#[from] SetupError),

    /// Dynamic resolution was configured but no registry connection given
    #[error("dynamic broker resolution requires a registry client")]
    MissingRegistryClient,
}

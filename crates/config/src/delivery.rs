//! Delivery client configuration
//!
//! Producer settings the delivery client is built with. They are fixed
//! for the life of an engine; a client rebuilt after a failure reuses
//! them against the fresh broker set.

use serde::Deserialize;
use std::time::Duration;

/// Compression codec applied by the producer
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    /// No compression (default)
    #[default]
    None,
    /// Gzip
    Gzip,
    /// Snappy
    Snappy,
    /// LZ4
    Lz4,
    /// Zstandard
    Zstd,
}

/// Delivery client settings
///
/// # Example
///
/// ```toml
/// [delivery]
/// client_id = "shipper-7"
/// max_retries = 5
/// required_acks = -1
/// ack_timeout = "3s"
/// compression = "snappy"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Client identifier reported to the brokers
    /// Default: "kite"
    pub client_id: String,

    /// Client-level retries for transient send failures
    /// Default: 3
    pub max_retries: u32,

    /// Replica acknowledgements required per write (-1 = all)
    /// Default: 1
    pub required_acks: i16,

    /// How long to wait for acknowledgements
    /// Default: 1500ms
    #[serde(with = "humantime_serde")]
    pub ack_timeout: Duration,

    /// Compression codec
    /// Default: none
    pub compression: CompressionCodec,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            client_id: "kite".to_string(),
            max_retries: 3,
            required_acks: 1,
            ack_timeout: Duration::from_millis(1500),
            compression: CompressionCodec::None,
        }
    }
}

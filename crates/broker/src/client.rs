//! Delivery client seam - settings and traits
//!
//! The engine talks to the broker cluster through two small traits: a
//! [`Transport`] that can build a client from a broker set, and the
//! [`DeliveryClient`] it builds. Production uses the rdkafka-backed
//! implementation in [`crate::kafka`]; tests script their own.

use std::time::Duration;

use kite_record::EncodedMessage;

use crate::error::{ClientBuildError, DeliveryError};
use crate::resolver::BrokerSet;

/// Compression codec applied by the producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
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

impl Compression {
    /// Codec name as the client library expects it
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Snappy => "snappy",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }
}

/// Fixed producer settings a client is built with
///
/// These never change over the life of an engine; a rebuilt client gets
/// the same settings against a fresh broker set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Client identifier reported to the brokers
    pub client_id: String,

    /// Compression codec for produced batches
    pub compression: Compression,

    /// How many replica acknowledgements a write needs
    pub required_acks: i16,

    /// How long to wait for those acknowledgements
    pub ack_timeout: Duration,

    /// Client-level retries for transient per-call failures
    pub max_retries: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            client_id: "kite".to_string(),
            compression: Compression::None,
            required_acks: 1,
            ack_timeout: Duration::from_millis(1500),
            max_retries: 3,
        }
    }
}

impl ClientSettings {
    /// Set the client identifier
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Set the compression codec
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set the required acknowledgement level
    #[must_use]
    pub fn with_required_acks(mut self, acks: i16) -> Self {
        self.required_acks = acks;
        self
    }

    /// Set the acknowledgement timeout
    #[must_use]
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    /// Set the client-level retry count
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// A live connection able to deliver message batches
pub trait DeliveryClient: Send {
    /// Deliver every message, honoring the settings the client was
    /// built with
    ///
    /// Returns an error once client-level retries are exhausted; partial
    /// delivery still counts as failure.
    fn deliver(&mut self, messages: &[EncodedMessage]) -> Result<(), DeliveryError>;
}

/// Factory building delivery clients from a broker set
pub trait Transport {
    /// The client type this transport produces
    type Client: DeliveryClient;

    /// Build a client against a non-empty broker set
    fn connect(
        &self,
        brokers: &BrokerSet,
        settings: &ClientSettings,
    ) -> Result<Self::Client, ClientBuildError>;
}

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

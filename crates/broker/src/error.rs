//! Broker-layer error types

use thiserror::Error;

/// Errors from a coordination-registry connection
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry could not be reached
    #[error("registry unreachable: {0}")]
    Unreachable(String),

    /// A queried node does not exist
    #[error("registry node not found: {0}")]
    NotFound(String),
}

/// Errors while resolving the current broker set
///
/// Never fatal: the engine logs the failure, runs with an empty broker
/// set and retries on the next refresh.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The registry query itself failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A broker's registered metadata could not be parsed
    #[error("malformed metadata for broker '{id}': {message}")]
    Metadata { id: String, message: String },
}

/// Errors while constructing a delivery client
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// Producer construction was rejected by the client library
    #[error("producer construction failed: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// The transport cannot currently produce a client
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Errors from a batch send
///
/// Always surfaced to the caller; the engine refreshes its broker set
/// and rebuilds the client, but never retries the failed batch itself.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// No client handle exists (empty broker set or failed build)
    #[error("no delivery client available")]
    NoClient,

    /// The producer refused to accept a message into its queue
    #[error("enqueue failed for topic '{topic}': {source}")]
    Enqueue {
        topic: String,
        #[source]
        source: rdkafka::error::KafkaError,
    },

    /// Delivery reports came back failed after client-level retries
    #[error("{failed} of {total} messages failed delivery, last: {last}")]
    Undelivered {
        failed: usize,
        total: usize,
        last: String,
    },

    /// Waiting for outstanding acknowledgements failed
    #[error("flush failed: {0}")]
    Flush(#[source] rdkafka::error::KafkaError),
}

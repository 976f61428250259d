//! EncodedMessage - the unit handed to the delivery layer
//!
//! An immutable (topic, payload, partition key) triple. Produced once per
//! record by the encoder and routing step, then owned by the batch it
//! joins; never mutated afterwards.

/// A serialized record addressed to a destination topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    topic: String,
    payload: Vec<u8>,
    key: Option<String>,
}

impl EncodedMessage {
    /// Create a new encoded message
    pub fn new(topic: impl Into<String>, payload: Vec<u8>, key: Option<String>) -> Self {
        Self {
            topic: topic.into(),
            payload,
            key,
        }
    }

    /// Destination topic
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Serialized record payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Optional partition key
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Payload size in bytes (the size batching accounts against)
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

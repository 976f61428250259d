//! Batch Assembler - byte-bounded batching across topics
//!
//! Accumulates encoded messages, possibly for different topics, into one
//! outgoing batch. The byte budget bounds latency and memory, not the
//! protocol: a flush happens *before* the batch would outgrow the
//! budget, and a single message larger than the whole budget still goes
//! out alone rather than being dropped or split.

use kite_record::EncodedMessage;

/// Default aggregate batch size in bytes
pub const DEFAULT_MAX_BATCH_BYTES: usize = 4096;

/// An ordered group of messages sent in one delivery call
#[derive(Debug, Default)]
pub struct Batch {
    messages: Vec<EncodedMessage>,
    total_bytes: usize,
}

impl Batch {
    /// The messages in append order
    pub fn messages(&self) -> &[EncodedMessage] {
        &self.messages
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the batch holds no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Sum of payload byte lengths
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    fn push(&mut self, message: EncodedMessage) {
        self.total_bytes += message.len();
        self.messages.push(message);
    }
}

/// Accumulates messages into byte-bounded batches
#[derive(Debug)]
pub struct BatchAssembler {
    max_bytes: usize,
    current: Batch,
}

impl BatchAssembler {
    /// Create an assembler with a byte budget
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            current: Batch::default(),
        }
    }

    /// The configured byte budget
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Append a message; returns the previous batch when it had to flush
    ///
    /// The returned batch never contains the message just appended: a
    /// flush is triggered when the running total plus the new payload
    /// would exceed the budget, and the new message then opens the next
    /// batch.
    pub fn push(&mut self, message: EncodedMessage) -> Option<Batch> {
        let flushed = if !self.current.is_empty()
            && self.current.total_bytes() + message.len() > self.max_bytes
        {
            Some(std::mem::take(&mut self.current))
        } else {
            None
        };

        self.current.push(message);
        flushed
    }

    /// Drain whatever remains at end of input
    pub fn finish(&mut self) -> Option<Batch> {
        if self.current.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.current))
        }
    }

    /// Messages currently waiting in the open batch
    pub fn pending(&self) -> usize {
        self.current.len()
    }

    /// Bytes currently waiting in the open batch
    pub fn pending_bytes(&self) -> usize {
        self.current.total_bytes()
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod batch_test;

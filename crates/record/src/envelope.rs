//! Envelope - the (tag, time, record) triple handed in by upstream
//!
//! Upstream buffering hands the engine either individual envelopes or a
//! MessagePack-framed chunk of them. [`EnvelopeReader`] walks a chunk
//! lazily, yielding one envelope per frame without materializing the
//! whole group.

use std::io::Cursor;

use serde_json::Value;

use crate::error::EnvelopeError;

/// An ordered `field name -> value` mapping
///
/// Insertion order is preserved, so line-oriented encodings emit fields
/// in the order upstream produced them.
pub type Record = serde_json::Map<String, Value>;

/// A single tagged, timestamped record
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Routing tag assigned by the emitter
    pub tag: String,

    /// Event time in seconds (or finer, as upstream provides)
    pub time: i64,

    /// The record itself
    pub record: Record,
}

impl Envelope {
    /// Create a new envelope
    pub fn new(tag: impl Into<String>, time: i64, record: Record) -> Self {
        Self {
            tag: tag.into(),
            time,
            record,
        }
    }
}

/// Render a record value as plain text
///
/// Strings are taken verbatim, null renders as the empty string, other
/// scalars use their display form and nested values their compact JSON
/// text. Used by the line-delimited and fixed-attribute encodings and by
/// per-record routing lookups.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        nested => nested.to_string(),
    }
}

/// Lazy reader over a MessagePack-framed envelope chunk
///
/// Each frame is a `[tag, time, record]` array. The reader is fused: the
/// first malformed frame is yielded as an error and iteration stops, since
/// frame boundaries cannot be trusted past that point.
pub struct EnvelopeReader<'a> {
    cursor: Cursor<&'a [u8]>,
    failed: bool,
}

impl<'a> EnvelopeReader<'a> {
    /// Create a reader over a chunk of framed envelopes
    pub fn new(chunk: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(chunk),
            failed: false,
        }
    }

    fn exhausted(&self) -> bool {
        self.cursor.position() as usize >= self.cursor.get_ref().len()
    }
}

impl Iterator for EnvelopeReader<'_> {
    type Item = Result<Envelope, EnvelopeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.exhausted() {
            return None;
        }

        match rmp_serde::decode::from_read::<_, (String, i64, Record)>(&mut self.cursor) {
            Ok((tag, time, record)) => Some(Ok(Envelope { tag, time, record })),
            Err(err) => {
                self.failed = true;
                Some(Err(EnvelopeError::Frame(err)))
            }
        }
    }
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod envelope_test;

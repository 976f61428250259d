//! Kite - Record Model
//!
//! The record-side half of the dispatch pipeline: tagged, timestamped
//! records flow in as [`Envelope`]s, get reshaped by the [`FieldMapper`],
//! and leave as serialized payloads produced by the [`Encoder`].
//!
//! # Architecture
//!
//! ```text
//! chunk bytes ──> [EnvelopeReader] ──> Envelope ──> [FieldMapper] ──> [Encoder] ──> EncodedMessage
//! ```
//!
//! Records are ordered `name -> value` mappings. Every stage here is pure:
//! the mapper and encoder never mutate the record they are given, they
//! produce copies when they need to add fields.
//!
//! # Example
//!
//! ```ignore
//! use kite_record::{Encoder, Encoding, FormatterRegistry, Separator};
//!
//! let mut registry = FormatterRegistry::new();
//! let encoder = Encoder::from_selector("json", Separator::Tab, true, true, &mut registry)?;
//! let payload = encoder.encode("app.log", 1700000000, &record)?;
//! ```

mod encode;
mod envelope;
mod error;
mod formatter;
mod mapper;
mod message;

pub use encode::{AttributeList, Encoder, Encoding, Separator};
pub use envelope::{value_text, Envelope, EnvelopeReader, Record};
pub use error::{EncodeError, EnvelopeError, SetupError};
pub use formatter::{FormatterRegistry, RecordFormatter};
pub use mapper::{FieldMapper, EMPTY_VALUE};
pub use message::EncodedMessage;

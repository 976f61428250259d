//! Kite - Dispatch Engine
//!
//! The output stage of the pipeline: consumes a group of tagged,
//! timestamped records, reshapes and encodes each one, assembles
//! byte-bounded batches per destination topic and pushes them at the
//! broker cluster, recovering its client after delivery failures.
//!
//! # Architecture
//!
//! ```text
//! record group ──> [FieldMapper] ──> [Encoder] ──> [BatchAssembler] ──> [DeliveryClient] ──> brokers
//!                                                                            │ failure
//!                       refresh broker set + rebuild client  <───────────────┘
//! ```
//!
//! # Delivery semantics
//!
//! At-least-once, enforced by never lying about success: a group either
//! dispatches completely and returns `Ok`, or the original failure is
//! raised and the caller re-delivers the whole group later. Recovery
//! (broker re-resolution and client rebuild) only prepares the next
//! attempt; the engine never re-sends a failed batch on its own.
//!
//! # Concurrency
//!
//! One engine instance is single-threaded and callers serialize
//! invocations on it; independent destinations get independent engines
//! that share nothing.

mod batch;
mod engine;
mod error;
mod metrics;

pub use batch::{Batch, BatchAssembler, DEFAULT_MAX_BATCH_BYTES};
pub use engine::{DispatchConfig, DispatchEngine};
pub use error::{BuildError, DispatchError, Result};
pub use metrics::{DispatchMetrics, MetricsSnapshot};

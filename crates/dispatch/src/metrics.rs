//! Dispatch engine metrics
//!
//! Lock-free counters updated on the engine's hot path and read from
//! wherever the host reports metrics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one engine instance
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Record groups handed to the engine
    groups_received: AtomicU64,

    /// Individual records mapped and encoded
    records_processed: AtomicU64,

    /// Batches delivered successfully
    batches_sent: AtomicU64,

    /// Batches whose delivery failed
    batches_failed: AtomicU64,

    /// Messages delivered successfully
    messages_sent: AtomicU64,

    /// Payload bytes delivered successfully
    bytes_sent: AtomicU64,

    /// Delivery client rebuilds (initial build included)
    client_rebuilds: AtomicU64,
}

impl DispatchMetrics {
    /// Create a zeroed metrics instance
    pub const fn new() -> Self {
        Self {
            groups_received: AtomicU64::new(0),
            records_processed: AtomicU64::new(0),
            batches_sent: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
            messages_sent: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            client_rebuilds: AtomicU64::new(0),
        }
    }

    /// Record an incoming group
    #[inline]
    pub fn group_received(&self) {
        self.groups_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one processed record
    #[inline]
    pub fn record_processed(&self) {
        self.records_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a delivered batch
    #[inline]
    pub fn batch_sent(&self, message_count: u64, byte_count: u64) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
        self.messages_sent
            .fetch_add(message_count, Ordering::Relaxed);
        self.bytes_sent.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a failed batch
    #[inline]
    pub fn batch_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a client rebuild
    #[inline]
    pub fn client_rebuilt(&self) {
        self.client_rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            groups_received: self.groups_received.load(Ordering::Relaxed),
            records_processed: self.records_processed.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            client_rebuilds: self.client_rebuilds.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of the counters at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub groups_received: u64,
    pub records_processed: u64,
    pub batches_sent: u64,
    pub batches_failed: u64,
    pub messages_sent: u64,
    pub bytes_sent: u64,
    pub client_rebuilds: u64,
}

//! Routing configuration
//!
//! Per-engine routing defaults. A record that carries its own `topic` or
//! `partition_key` field overrides these; a record with neither topic
//! falls back to its tag.

use serde::Deserialize;

/// Default routing for records that carry none of their own
///
/// # Example
///
/// ```toml
/// [route]
/// default_topic = "events"
/// partition_key = "host-7"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Topic for records without a `topic` field
    /// Default: none (the record's tag is used)
    pub default_topic: Option<String>,

    /// Partition key for records without a `partition_key` field
    /// Default: none (the cluster picks a partition)
    pub partition_key: Option<String>,
}

//! Broker discovery configuration
//!
//! Exactly one of the two discovery modes is configured: a static
//! endpoint list, or a coordination-registry address. The presence of
//! `registry` selects dynamic resolution.

use serde::Deserialize;

/// Where the broker cluster lives
///
/// # Example
///
/// ```toml
/// # static list
/// [brokers]
/// endpoints = "k1:9092,k2:9092"
///
/// # or registry-backed discovery
/// [brokers]
/// registry = "zk1:2181,zk2:2181"
/// registry_path = "/kafka"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrokersConfig {
    /// Comma-delimited `host:port` broker list
    pub endpoints: Option<String>,

    /// Coordination-registry address; setting this selects dynamic
    /// resolution
    pub registry: Option<String>,

    /// Registry path broker ids are registered under
    /// Default: "/brokers"
    pub registry_path: String,
}

impl Default for BrokersConfig {
    fn default() -> Self {
        Self {
            endpoints: None,
            registry: None,
            registry_path: "/brokers".to_string(),
        }
    }
}

impl BrokersConfig {
    /// Whether registry-backed discovery is selected
    pub fn is_dynamic(&self) -> bool {
        self.registry.is_some()
    }
}

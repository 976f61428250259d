//! Batching configuration

use serde::Deserialize;

/// Byte budget for outgoing batches
///
/// The budget bounds latency and memory, not the protocol: a single
/// message larger than the budget still goes out, alone.
///
/// # Example
///
/// ```toml
/// [batch]
/// max_bytes = 65536
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Aggregate batch size in bytes
    /// Default: 4096
    pub max_bytes: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_bytes: 4096 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        assert_eq!(BatchConfig::default().max_bytes, 4096);
    }

    #[test]
    fn test_deserialize() {
        let config: BatchConfig = toml::from_str("max_bytes = 65536").unwrap();
        assert_eq!(config.max_bytes, 65536);
    }
}

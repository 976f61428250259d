//! Kite Configuration
//!
//! TOML-based configuration loading with sensible defaults. A minimal
//! config only names where the brokers are; everything else has a
//! working default.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use kite_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[brokers]\nendpoints = \"k1:9092\"").unwrap();
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [route]
//! default_topic = "events"
//!
//! [brokers]
//! endpoints = "k1:9092,k2:9092"
//!
//! [delivery]
//! client_id = "shipper-7"
//! required_acks = -1
//! ack_timeout = "3s"
//! compression = "snappy"
//!
//! [format]
//! encoding = "ltsv"
//! include_tag = true
//!
//! [batch]
//! max_bytes = 65536
//!
//! [fields]
//! mapping = "status:unknown"
//! conversions = "1:active,0:inactive"
//!
//! [log]
//! level = "info"
//! ```

mod batch;
mod brokers;
mod delivery;
mod error;
mod fields;
mod format;
mod logging;
mod route;

pub use batch::BatchConfig;
pub use brokers::BrokersConfig;
pub use delivery::{CompressionCodec, DeliveryConfig};
pub use error::{ConfigError, Result};
pub use fields::{parse_field_mapping, parse_value_conversions, FieldsConfig};
pub use format::{FieldSeparator, FormatConfig};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use route::RouteConfig;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional in the TOML; validation then insists on a
/// usable whole (exactly one broker source, a non-zero batch budget,
/// parseable field specs).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default routing (topic, partition key)
    pub route: RouteConfig,

    /// Broker discovery (static list or registry)
    pub brokers: BrokersConfig,

    /// Delivery client settings
    pub delivery: DeliveryConfig,

    /// Payload format selection
    pub format: FormatConfig,

    /// Batch byte budget
    pub batch: BatchConfig,

    /// Field mapping and value conversion specs
    pub fields: FieldsConfig,

    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is
    /// malformed, or validation fails.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse and validate configuration from a TOML string
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks that exactly one broker source is set, the batch budget
    /// is non-zero, and the field specs parse.
    pub fn validate(&self) -> Result<()> {
        match (&self.brokers.endpoints, &self.brokers.registry) {
            (None, None) => return Err(ConfigError::NoBrokers),
            (Some(_), Some(_)) => return Err(ConfigError::AmbiguousBrokers),
            (Some(endpoints), None) if endpoints.trim().is_empty() => {
                return Err(ConfigError::invalid_value(
                    "endpoints",
                    "broker list must not be blank",
                ));
            }
            _ => {}
        }

        if self.batch.max_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "max_bytes",
                "batch budget must be greater than zero",
            ));
        }

        if self.format.encoding.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "encoding",
                "encoding selector must not be blank",
            ));
        }

        parse_field_mapping(&self.fields.mapping)?;
        parse_value_conversions(&self.fields.conversions)?;

        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A field-mapping spec entry is malformed
    #[error("invalid field mapping entry '{entry}': {reason}")]
    FieldMapping {
        /// The offending entry
        entry: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// A value-conversion spec entry is malformed
    #[error("invalid value conversion entry '{entry}': {reason}")]
    ValueConversion {
        /// The offending entry
        entry: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Neither a broker list nor a registry address is configured
    #[error("no brokers configured - set either [brokers].endpoints or [brokers].registry")]
    NoBrokers,

    /// Both broker sources configured at once
    #[error("ambiguous broker configuration - endpoints and registry are mutually exclusive")]
    AmbiguousBrokers,

    /// Validation error - invalid value
    #[error("invalid {field}: {message}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },
}

impl ConfigError {
    /// Create a FieldMapping error
    pub fn field_mapping(entry: impl Into<String>, reason: &'static str) -> Self {
        Self::FieldMapping {
            entry: entry.into(),
            reason,
        }
    }

    /// Create a ValueConversion error
    pub fn value_conversion(entry: impl Into<String>, reason: &'static str) -> Self {
        Self::ValueConversion {
            entry: entry.into(),
            reason,
        }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

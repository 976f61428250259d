//! Field mapping and value conversion specs
//!
//! Both specs are compact delimited strings, parsed eagerly at load
//! time so a typo fails configuration instead of silently mangling
//! records later.
//!
//! - mapping: `field:default,field:default,...` - an entry without a
//!   `:` gets an empty default
//! - conversions: `match:replacement,match:replacement,...` - applied
//!   in order, first match wins

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Field mapping and value conversion configuration
///
/// # Example
///
/// ```toml
/// [fields]
/// mapping = "status:unknown,region:eu"
/// conversions = "1:active,0:inactive"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldsConfig {
    /// Field mapping spec
    /// Default: empty (mapping stage skipped)
    pub mapping: String,

    /// Value conversion spec
    /// Default: empty
    pub conversions: String,
}

/// Parse a `field:default,...` mapping spec
///
/// Field names must be unique and non-empty; a missing default means
/// the empty string. Blank entries are ignored.
pub fn parse_field_mapping(spec: &str) -> Result<Vec<(String, String)>> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for entry in spec.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (field, default) = match entry.split_once(':') {
            Some((field, default)) => (field.trim(), default),
            None => (entry, ""),
        };

        if field.is_empty() {
            return Err(ConfigError::field_mapping(entry, "empty field name"));
        }
        if pairs.iter().any(|(existing, _)| existing == field) {
            return Err(ConfigError::field_mapping(entry, "duplicate field name"));
        }

        pairs.push((field.to_string(), default.to_string()));
    }

    Ok(pairs)
}

/// Parse a `match:replacement,...` conversion spec
///
/// Every entry needs both sides; duplicates are allowed since rules
/// apply first-match-wins.
pub fn parse_value_conversions(spec: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();

    for entry in spec.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (from, to) = entry
            .split_once(':')
            .ok_or_else(|| ConfigError::value_conversion(entry, "missing ':' separator"))?;

        if from.is_empty() {
            return Err(ConfigError::value_conversion(entry, "empty match value"));
        }

        pairs.push((from.to_string(), to.to_string()));
    }

    Ok(pairs)
}

//! Field Mapper - static renaming, defaulting and value substitution
//!
//! Applies a fixed set of field rules to one record at a time:
//!
//! - every mapped field present in the input has its value run through the
//!   conversion table (first matching rule wins, unchanged otherwise)
//! - every mapped field absent from the input is inserted with its default
//! - fields outside the mapping copy through untouched
//!
//! The output record carries the union of the input's fields and the
//! mapping's fields. The mapper is pure; the input record is never
//! mutated. An empty mapping means the engine skips this stage entirely,
//! decided once at configuration time rather than per record.

use serde_json::Value;

use crate::envelope::{value_text, Record};

/// Replacement token that resolves to the empty string
///
/// A conversion rule cannot otherwise express "replace with nothing",
/// since an empty right-hand side in the delimited spec already means
/// the empty default.
pub const EMPTY_VALUE: &str = "__EMPTY__";

/// Static field mapping with value conversion rules
#[derive(Debug, Clone, Default)]
pub struct FieldMapper {
    /// Mapped field names with their defaults, in spec order
    mapping: Vec<(String, String)>,

    /// Ordered (match, replacement) pairs; first match wins
    conversions: Vec<(String, String)>,
}

impl FieldMapper {
    /// Create a mapper from parsed mapping and conversion pairs
    pub fn new(mapping: Vec<(String, String)>, conversions: Vec<(String, String)>) -> Self {
        Self {
            mapping,
            conversions,
        }
    }

    /// Whether the mapping holds no rules at all
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Number of mapped fields
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Apply the mapping to one record, producing a new record
    pub fn map(&self, record: &Record) -> Record {
        let mut mapped = record.clone();

        for (field, default) in &self.mapping {
            match record.get(field) {
                Some(value) => {
                    if let Some(replacement) = self.convert(value) {
                        mapped.insert(field.clone(), Value::String(replacement));
                    }
                }
                None => {
                    mapped.insert(field.clone(), Value::String(default.clone()));
                }
            }
        }

        mapped
    }

    /// Look up a conversion for a value, comparing its text form
    fn convert(&self, value: &Value) -> Option<String> {
        let text = value_text(value);

        for (from, to) in &self.conversions {
            if *from == text {
                return Some(if to == EMPTY_VALUE {
                    String::new()
                } else {
                    to.clone()
                });
            }
        }

        None
    }
}

#[cfg(test)]
#[path = "mapper_test.rs"]
mod mapper_test;

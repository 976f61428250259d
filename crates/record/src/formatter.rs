//! Formatter registry - delegated payload formatters
//!
//! The engine ships a fixed set of built-in encodings. Anything else in
//! the encoding selector is resolved by name against this registry, so a
//! host can plug in its own payload formats without this crate knowing
//! about them.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = FormatterRegistry::new();
//! registry.register("audit", Box::new(AuditFormatter::new()));
//!
//! // selector "audit" now resolves to the registered formatter
//! let encoder = Encoder::from_selector("audit", Separator::Tab, false, false, &mut registry)?;
//! ```

use std::collections::HashMap;

use crate::envelope::Record;
use crate::error::EncodeError;

/// A pluggable payload formatter resolved by name at setup time
///
/// Formatters see the same view as the built-in encodings: when the
/// include-tag/include-time flags are set, `tag` and `time` are already
/// present as ordinary fields of the record.
pub trait RecordFormatter: Send {
    /// Name used in error messages
    fn name(&self) -> &str;

    /// Produce the serialized payload for one record
    fn format(&self, tag: &str, time: i64, record: &Record) -> Result<Vec<u8>, EncodeError>;
}

/// Registry of named formatters, consulted once at configuration time
#[derive(Default)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Box<dyn RecordFormatter>>,
}

impl FormatterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    /// Register a formatter under a selector name
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register(&mut self, name: impl Into<String>, formatter: Box<dyn RecordFormatter>) {
        self.formatters.insert(name.into(), formatter);
    }

    /// Take the formatter registered under a name, if any
    ///
    /// Resolution transfers ownership: a formatter backs exactly one
    /// encoder instance.
    pub fn take(&mut self, name: &str) -> Option<Box<dyn RecordFormatter>> {
        self.formatters.remove(name)
    }

    /// Whether a formatter is registered under a name
    pub fn contains(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Names of all registered formatters
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.formatters.keys()
    }
}

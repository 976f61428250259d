//! Content Encoder - record to payload bytes
//!
//! One encoding strategy is selected at configuration time and reused for
//! every record; no per-record branching on the selector string.
//!
//! Built-in encodings:
//!
//! | Selector        | Output                                        |
//! |-----------------|-----------------------------------------------|
//! | `json`          | the record as a JSON object                   |
//! | `ltsv`          | `key:value` pairs joined by tabs              |
//! | `msgpack`       | the record as a MessagePack map               |
//! | `attr:<names>`  | named attribute values joined by a separator  |
//! | anything else   | delegated to a registered [`RecordFormatter`] |
//!
//! When the include-tag or include-time flag is set, the encoder works on
//! an augmented copy of the record carrying `tag`/`time` as ordinary
//! fields, so every encoding (and every delegated formatter) sees them
//! the same way. The caller's record is never touched.

use std::str::FromStr;

use serde_json::Value;

use crate::envelope::{value_text, Record};
use crate::error::{EncodeError, SetupError};
use crate::formatter::{FormatterRegistry, RecordFormatter};

/// Single-character separator for the fixed-attribute encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Separator {
    /// ASCII space
    Space,
    /// Comma
    Comma,
    /// Start-of-heading control character (0x01)
    Soh,
    /// Tab (default)
    #[default]
    Tab,
}

impl Separator {
    /// The separator character itself
    pub fn as_char(self) -> char {
        match self {
            Self::Space => ' ',
            Self::Comma => ',',
            Self::Soh => '\u{1}',
            Self::Tab => '\t',
        }
    }
}

impl FromStr for Separator {
    type Err = String;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "space" => Ok(Self::Space),
            "comma" => Ok(Self::Comma),
            "soh" => Ok(Self::Soh),
            "tab" => Ok(Self::Tab),
            other => Err(format!(
                "unknown separator '{other}', expected tab, space, comma or soh"
            )),
        }
    }
}

/// Ordered attribute names for the fixed-attribute encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeList {
    names: Vec<String>,
    separator: Separator,
}

impl AttributeList {
    /// Create an attribute list with a separator
    pub fn new(names: Vec<String>, separator: Separator) -> Self {
        Self { names, separator }
    }

    /// Attribute names in output order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Join the named attribute values; absent attributes render empty
    fn render(&self, record: &Record) -> String {
        let mut line = String::new();

        for (index, name) in self.names.iter().enumerate() {
            if index > 0 {
                line.push(self.separator.as_char());
            }
            if let Some(value) = record.get(name) {
                line.push_str(&value_text(value));
            }
        }

        line
    }
}

/// The encoding strategy, resolved once at setup
pub enum Encoding {
    /// JSON object text
    Json,
    /// Tab-joined `key:value` pairs
    Ltsv,
    /// MessagePack map
    MessagePack,
    /// Named attribute values joined by a separator
    Attributes(AttributeList),
    /// Delegated to a registered formatter
    Custom(Box<dyn RecordFormatter>),
}

impl Encoding {
    /// Short name for logging
    pub fn name(&self) -> &str {
        match self {
            Self::Json => "json",
            Self::Ltsv => "ltsv",
            Self::MessagePack => "msgpack",
            Self::Attributes(_) => "attr",
            Self::Custom(formatter) => formatter.name(),
        }
    }
}

/// Per-record payload encoder
///
/// Holds the resolved encoding plus the tag/time inclusion flags.
pub struct Encoder {
    encoding: Encoding,
    include_tag: bool,
    include_time: bool,
}

impl Encoder {
    /// Create an encoder from an already-resolved encoding
    ///
    /// For the fixed-attribute encoding the synthetic `time` and `tag`
    /// names are prepended here, once, so the attribute order is fixed
    /// before the first record arrives.
    pub fn new(encoding: Encoding, include_tag: bool, include_time: bool) -> Self {
        let encoding = match encoding {
            Encoding::Attributes(mut list) => {
                if include_time {
                    list.names.insert(0, "time".to_string());
                }
                if include_tag {
                    list.names.insert(0, "tag".to_string());
                }
                Encoding::Attributes(list)
            }
            other => other,
        };

        Self {
            encoding,
            include_tag,
            include_time,
        }
    }

    /// Resolve an encoding selector into an encoder
    ///
    /// `json`, `ltsv`, `msgpack` and `attr:<name>,<name>,...` are built
    /// in; any other selector takes the formatter registered under that
    /// name out of `registry`.
    pub fn from_selector(
        selector: &str,
        separator: Separator,
        include_tag: bool,
        include_time: bool,
        registry: &mut FormatterRegistry,
    ) -> Result<Self, SetupError> {
        let encoding = match selector {
            "json" => Encoding::Json,
            "ltsv" => Encoding::Ltsv,
            "msgpack" => Encoding::MessagePack,
            attr if attr.starts_with("attr:") => {
                let names: Vec<String> = attr["attr:".len()..]
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect();
                if names.is_empty() {
                    return Err(SetupError::EmptyAttributeList);
                }
                Encoding::Attributes(AttributeList::new(names, separator))
            }
            name => {
                let formatter = registry
                    .take(name)
                    .ok_or_else(|| SetupError::UnknownFormatter(name.to_string()))?;
                Encoding::Custom(formatter)
            }
        };

        let encoder = Self::new(encoding, include_tag, include_time);
        tracing::debug!(
            encoding = encoder.encoding_name(),
            include_tag,
            include_time,
            "encoding selected"
        );
        Ok(encoder)
    }

    /// Name of the resolved encoding
    pub fn encoding_name(&self) -> &str {
        self.encoding.name()
    }

    /// Encode one record into its payload bytes
    pub fn encode(&self, tag: &str, time: i64, record: &Record) -> Result<Vec<u8>, EncodeError> {
        if self.include_tag || self.include_time {
            let mut augmented = record.clone();
            if self.include_time {
                augmented.insert("time".to_string(), Value::from(time));
            }
            if self.include_tag {
                augmented.insert("tag".to_string(), Value::String(tag.to_string()));
            }
            self.encode_record(tag, time, &augmented)
        } else {
            self.encode_record(tag, time, record)
        }
    }

    fn encode_record(
        &self,
        tag: &str,
        time: i64,
        record: &Record,
    ) -> Result<Vec<u8>, EncodeError> {
        match &self.encoding {
            Encoding::Json => Ok(serde_json::to_vec(record)?),
            Encoding::Ltsv => Ok(ltsv_line(record).into_bytes()),
            Encoding::MessagePack => Ok(rmp_serde::to_vec(record)?),
            Encoding::Attributes(list) => Ok(list.render(record).into_bytes()),
            Encoding::Custom(formatter) => formatter.format(tag, time, record),
        }
    }
}

/// Render a record as one LTSV line
fn ltsv_line(record: &Record) -> String {
    let mut line = String::new();

    for (index, (key, value)) in record.iter().enumerate() {
        if index > 0 {
            line.push('\t');
        }
        line.push_str(key);
        line.push(':');
        line.push_str(&value_text(value));
    }

    line
}

#[cfg(test)]
#[path = "encode_test.rs"]
mod encode_test;

//! Payload format configuration
//!
//! Selects the content encoding and the tag/time inclusion flags. The
//! separator only matters for the fixed-attribute encoding.

use serde::Deserialize;

/// Separator for the fixed-attribute encoding
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldSeparator {
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

/// Content encoding selection
///
/// The `encoding` selector is `json`, `ltsv`, `msgpack`,
/// `attr:<name>,<name>,...` or the name of a registered formatter.
///
/// # Example
///
/// ```toml
/// [format]
/// encoding = "attr:host,message"
/// include_tag = true
/// include_time = true
/// separator = "comma"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Encoding selector
    /// Default: "json"
    pub encoding: String,

    /// Write the tag into each record before encoding
    /// Default: false
    pub include_tag: bool,

    /// Write the time into each record before encoding
    /// Default: false
    pub include_time: bool,

    /// Attribute separator (tab, space, comma, soh)
    /// Default: tab
    pub separator: FieldSeparator,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            encoding: "json".to_string(),
            include_tag: false,
            include_time: false,
            separator: FieldSeparator::Tab,
        }
    }
}

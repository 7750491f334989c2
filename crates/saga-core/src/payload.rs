use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Opaque presentation data attached to slides, panels, steps and items.
///
/// The engine never branches on payload contents. Keys such as `text`,
/// `image` or `title` are conventions between the script author and the
/// presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, String>);

impl Payload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a payload holding only a `text` entry.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with("text", text)
    }

    /// Add or replace an entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The conventional `text` entry, if any.
    pub fn body(&self) -> Option<&str> {
        self.get("text")
    }

    /// Whether the payload has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

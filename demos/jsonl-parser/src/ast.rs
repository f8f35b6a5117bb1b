//! JSON value tree.
//!
//! Values carry no positions; the engine reports failure offsets in token
//! units and successful records are plain data.

use std::collections::HashMap;

/// A parsed JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    /// `null`
    Null,
    /// `true` or `false`
    Bool(bool),
    /// A number, kept textual to preserve precision
    Number(String),
    /// A string value
    String(String),
    /// An array `[...]`
    Array(Vec<JsonValue>),
    /// An object `{...}`
    Object(JsonObject),
}

/// A JSON object with its keys in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonObject {
    /// Key-value pairs in source order
    pub entries: Vec<(String, JsonValue)>,
}

impl JsonValue {
    /// Looks up a key in an object value.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match self {
            JsonValue::Object(obj) => obj.get(key),
            _ => None,
        }
    }

    /// Element count of an array or object value.
    pub fn len(&self) -> Option<usize> {
        match self {
            JsonValue::Array(items) => Some(items.len()),
            JsonValue::Object(obj) => Some(obj.len()),
            _ => None,
        }
    }

    /// The text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// A number value, converted to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsonValue::Number(n) => n.parse().ok(),
            _ => None,
        }
    }

    /// An object value as a map view (loses key ordering).
    pub fn as_object(&self) -> Option<HashMap<&str, &JsonValue>> {
        match self {
            JsonValue::Object(obj) => {
                Some(obj.entries.iter().map(|(k, v)| (k.as_str(), v)).collect())
            }
            _ => None,
        }
    }

    /// Rough memory footprint of this value in bytes.
    pub fn estimated_size(&self) -> usize {
        let base = std::mem::size_of::<Self>();
        let content = match self {
            JsonValue::Null | JsonValue::Bool(_) => 0,
            JsonValue::Number(s) | JsonValue::String(s) => s.capacity(),
            JsonValue::Array(items) => {
                items.capacity() * std::mem::size_of::<JsonValue>()
                    + items.iter().map(|v| v.estimated_size()).sum::<usize>()
            }
            JsonValue::Object(obj) => {
                obj.entries.capacity() * std::mem::size_of::<(String, JsonValue)>()
                    + obj
                        .entries
                        .iter()
                        .map(|(k, v)| k.capacity() + v.estimated_size())
                        .sum::<usize>()
            }
        };
        base + content
    }
}

impl JsonObject {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: String, value: JsonValue) {
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, JsonValue)> {
        self.entries.iter()
    }
}

impl FromIterator<(String, JsonValue)> for JsonObject {
    fn from_iter<I: IntoIterator<Item = (String, JsonValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

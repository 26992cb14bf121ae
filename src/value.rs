//! Wire values and event property snapshots.
//!
//! The two transports deliver widget properties in different shapes: HTTP
//! query strings carry everything as text (booleans as `"true"` / `"false"`),
//! while push payloads are JSON with native booleans. [`PropValue`] is the
//! normalized server-side form, and [`EventProps`] is the property snapshot a
//! DOM event carries to the server.
//!
//! Canonical wire shapes: query-string booleans are normalized to
//! [`PropValue::Bool`] at parse time; JSON payloads must use native booleans —
//! a JSON string `"true"` stays [`PropValue::Text`] and is *not* visible
//! through [`EventProps::get_bool`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// PropValue
// ---------------------------------------------------------------------------

/// A single property value as seen on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// A native boolean.
    Bool(bool),
    /// A JSON number.
    Number(f64),
    /// Free-form text.
    Text(String),
}

impl PropValue {
    /// The boolean value, if this is a native boolean.
    ///
    /// Deliberately does not coerce `Text("true")`: string booleans are only
    /// legal on query strings, where parsing already normalized them.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The text value, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    /// The numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Parse a query-string value, normalizing the literal strings `"true"`
    /// and `"false"` into booleans.
    pub fn from_query_str(raw: &str) -> Self {
        match raw {
            "true" => PropValue::Bool(true),
            "false" => PropValue::Bool(false),
            other => PropValue::Text(other.to_owned()),
        }
    }

    /// Convert a JSON value into a wire value. Strings stay strings.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(PropValue::Bool(*b)),
            Value::Number(n) => n.as_f64().map(PropValue::Number),
            Value::String(s) => Some(PropValue::Text(s.clone())),
            _ => None,
        }
    }

    /// Convert back into a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            PropValue::Bool(b) => Value::Bool(*b),
            PropValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PropValue::Text(t) => Value::String(t.clone()),
        }
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Text(s.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Text(s)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

// ---------------------------------------------------------------------------
// FilePart
// ---------------------------------------------------------------------------

/// A multipart file part attached to an upload event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Original filename as reported by the browser.
    pub filename: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// Create a file part.
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventProps
// ---------------------------------------------------------------------------

/// The DOM-side property snapshot carried by an event.
///
/// Widgets first write these values back into their own state (the transport
/// calls `apply_event` before the user callback fires), then the callback
/// receives the snapshot as-is. Upload widgets may enrich the snapshot with
/// `filename` / `upload_path` entries during `apply_event`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventProps {
    values: BTreeMap<String, PropValue>,
    file: Option<FilePart>,
}

impl EventProps {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from query-string pairs, normalizing string booleans.
    pub fn from_query<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.to_owned(), PropValue::from_query_str(v)))
            .collect();
        Self { values, file: None }
    }

    /// Build a snapshot from a JSON object payload.
    ///
    /// Non-scalar members are skipped. String booleans are kept as text per
    /// the canonical wire shape.
    pub fn from_json(payload: &Value) -> Self {
        let mut values = BTreeMap::new();
        if let Value::Object(map) = payload {
            for (key, value) in map {
                if let Some(v) = PropValue::from_json(value) {
                    values.insert(key.clone(), v);
                }
            }
        }
        Self { values, file: None }
    }

    /// Attach a multipart file part (builder).
    pub fn with_file(mut self, file: FilePart) -> Self {
        self.file = Some(file);
        self
    }

    /// Insert a property value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove a property value.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.values.remove(key)
    }

    /// Look up a property value.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.values.get(key)
    }

    /// Look up a boolean property. Only native booleans qualify.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(PropValue::as_bool)
    }

    /// Look up a text property.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(PropValue::as_str)
    }

    /// Whether a property is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The attached file part, if any.
    pub fn file(&self) -> Option<&FilePart> {
        self.file.as_ref()
    }

    /// Take the attached file part out of the snapshot.
    pub fn take_file(&mut self) -> Option<FilePart> {
        self.file.take()
    }

    /// Iterate over the property entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of property entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the snapshot has no property entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialize the property entries as a JSON object.
    pub fn to_json(&self) -> Value {
        let map = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(map)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

//! Values carried by a log call: inherited params and call-site data.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Error payloads
// ---------------------------------------------------------------------------

/// The `{code, message, stack}` shape every error is reduced to on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInfo {
    pub code: Option<Value>,
    pub message: String,
    pub stack: String,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            stack: stack.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<Value>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Capture a Rust error. The stack is the display text followed by one
    /// line per `source()` in the chain.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let message = err.to_string();
        let mut stack = message.clone();
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            code: None,
            message,
            stack,
        }
    }

    /// Structural check: an object carrying non-empty `message` and `stack`
    /// strings is treated as an error, whatever else it holds.
    pub fn detect(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let message = obj.get("message")?.as_str().filter(|s| !s.is_empty())?;
        let stack = obj.get("stack")?.as_str().filter(|s| !s.is_empty())?;
        Some(Self {
            code: obj.get("code").cloned(),
            message: message.to_string(),
            stack: stack.to_string(),
        })
    }
}

impl From<ErrorInfo> for Value {
    fn from(err: ErrorInfo) -> Self {
        let mut map = Map::new();
        if let Some(code) = err.code {
            map.insert("code".into(), code);
        }
        map.insert("message".into(), Value::String(err.message));
        map.insert("stack".into(), Value::String(err.stack));
        Value::Object(map)
    }
}

// ---------------------------------------------------------------------------
// Call-site data
// ---------------------------------------------------------------------------

/// Data attached to a log call, classified once on entry.
#[derive(Debug, Clone, PartialEq)]
pub enum LoggableValue {
    /// Looked like an error; everything but code/message/stack is dropped.
    ErrorLike(ErrorInfo),
    /// Plain object; its properties become top-level record fields.
    Object(Map<String, Value>),
    /// Anything else (string, number, bool, array, null), emitted under `data`.
    Scalar(Value),
}

impl From<Value> for LoggableValue {
    fn from(value: Value) -> Self {
        if let Some(err) = ErrorInfo::detect(&value) {
            return LoggableValue::ErrorLike(err);
        }
        match value {
            Value::Object(map) => LoggableValue::Object(map),
            other => LoggableValue::Scalar(other),
        }
    }
}

impl From<ErrorInfo> for LoggableValue {
    fn from(err: ErrorInfo) -> Self {
        LoggableValue::ErrorLike(err)
    }
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// Ordered key/value bag inherited by child loggers.
///
/// A `None` value is an unset key: it is kept (and can be overridden) but
/// encodes to nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Option<Value>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, Some(value.into()));
        self
    }

    pub fn with_opt<V: Into<Value>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.insert(key, value.map(Into::into));
        self
    }

    /// Set a key, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<Value>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Copy of `self` with `overlay` applied on top; `overlay` wins on
    /// collisions. Neither input is touched.
    pub fn merged(&self, overlay: &Params) -> Params {
        let mut out = self.clone();
        for (key, value) in &overlay.entries {
            out.insert(key.clone(), value.clone());
        }
        out
    }

    /// Set entries as a JSON map, unset ones left out.
    pub fn to_map(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.clone().map(|v| (k.clone(), v)))
            .collect()
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let set: Vec<_> = self.iter().filter_map(|(k, v)| v.map(|v| (k, v))).collect();
        let mut map = serializer.serialize_map(Some(set.len()))?;
        for (key, value) in set {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            entries: map.into_iter().map(|(k, v)| (k, Some(v))).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, Some(value.into()));
        }
        params
    }
}

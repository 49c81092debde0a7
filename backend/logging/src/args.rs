//! Positional call arguments → message and data.

use serde_json::Value;

use crate::value::LoggableValue;

/// A log call with roles resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub message: String,
    pub data: Option<LoggableValue>,
}

impl Entry {
    /// Build from raw values. Non-string messages keep their JSON text.
    pub fn new(message: Value, data: Option<Value>) -> Self {
        let message = match message {
            Value::String(s) => s,
            other => other.to_string(),
        };
        Self {
            message,
            data: data.map(LoggableValue::from),
        }
    }
}

/// Calling convention, picked when the registry is configured.
///
/// `None` from [`ArgOrder::resolve`] means the call is a no-op.
#[derive(Clone, Copy)]
pub struct ArgOrder {
    name: &'static str,
    resolve: fn(Option<Value>, Option<Value>) -> Option<Entry>,
}

impl ArgOrder {
    /// `(message, data)`.
    pub const MESSAGE_FIRST: ArgOrder = ArgOrder {
        name: "message-first",
        resolve: message_first,
    };

    /// `(data, message)`; a lone argument is always the message.
    pub const DATA_FIRST: ArgOrder = ArgOrder {
        name: "data-first",
        resolve: data_first,
    };

    pub fn from_flip(flip_args: bool) -> Self {
        if flip_args {
            Self::DATA_FIRST
        } else {
            Self::MESSAGE_FIRST
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn resolve(&self, first: Option<Value>, second: Option<Value>) -> Option<Entry> {
        (self.resolve)(first, second)
    }
}

impl std::fmt::Debug for ArgOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

fn message_first(message: Option<Value>, data: Option<Value>) -> Option<Entry> {
    Some(Entry::new(message?, data))
}

fn data_first(data: Option<Value>, message: Option<Value>) -> Option<Entry> {
    match (data, message) {
        (data, Some(message)) => Some(Entry::new(message, data)),
        (Some(message), None) => Some(Entry::new(message, None)),
        (None, None) => None,
    }
}

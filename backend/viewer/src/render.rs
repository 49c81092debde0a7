//! One input line → one output line and the stream it belongs on.

use linelog::{Level, MESSAGE_FIELD};
use serde_json::{Map, Value};

use crate::palette::{level_color, RESET};

/// Fields shown in the fixed prefix and left out of the trailing object.
pub const RESERVED_FIELDS: [&str; 6] = ["hostname", "level", "name", "msg", "pid", "time"];

/// Older producers name the message field this way.
const LEGACY_MESSAGE_FIELD: &str = "message";

/// Shown in place of a missing prefix field.
const ABSENT: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub channel: Channel,
    pub text: String,
}

impl Rendered {
    fn passthrough(line: &str) -> Self {
        Self {
            channel: Channel::Stderr,
            text: line.to_string(),
        }
    }
}

/// `trace`, `debug` and `info` go to stdout; anything else to stderr.
pub fn channel_for(level: &str) -> Channel {
    match level.parse::<Level>() {
        Ok(level) if level <= Level::Info => Channel::Stdout,
        _ => Channel::Stderr,
    }
}

/// Render a single line.
///
/// Lines that aren't a JSON object with a string `level` come back verbatim
/// on stderr.
pub fn render_line(line: &str) -> Rendered {
    if !line.starts_with('{') {
        return Rendered::passthrough(line);
    }

    let Ok(Value::Object(record)) = serde_json::from_str::<Value>(line) else {
        return Rendered::passthrough(line);
    };

    let Some(level) = record.get("level").and_then(Value::as_str) else {
        return Rendered::passthrough(line);
    };

    Rendered {
        channel: channel_for(level),
        text: render_record(level, &record),
    }
}

fn render_record(level: &str, record: &Map<String, Value>) -> String {
    let message_key = if !record.contains_key(MESSAGE_FIELD)
        && record.contains_key(LEGACY_MESSAGE_FIELD)
    {
        LEGACY_MESSAGE_FIELD
    } else {
        MESSAGE_FIELD
    };

    let rest: Map<String, Value> = record
        .iter()
        .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()) && key.as_str() != message_key)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    format!(
        "{}{} {} {} {} :: {} {:#}{}",
        level_color(level),
        field(record, "time"),
        field(record, "hostname"),
        field(record, "name"),
        level.to_uppercase(),
        field(record, message_key),
        Value::Object(rest),
        RESET,
    )
}

fn field(record: &Map<String, Value>, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => ABSENT.to_string(),
    }
}

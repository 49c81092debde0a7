//! Message/data body encoding.
//!
//! The output is the inside of a JSON object (no braces) so the logger can
//! splice it after the fixed record fields without re-encoding anything.

use serde_json::{Map, Value};

use crate::value::{ErrorInfo, LoggableValue};

/// Field holding the message text on the wire.
pub const MESSAGE_FIELD: &str = "msg";

/// Encode `message` and optional `data` as a JSON body fragment.
///
/// - no data: `"msg":…`
/// - error-like data: `"error":{code,message,stack},"msg":…`
/// - object data: its properties (direct error-like values reduced in place),
///   then `"msg"`
/// - anything else: `"data":…,"msg":…`
pub fn serialize(message: &str, data: Option<LoggableValue>) -> String {
    let mut body = match data {
        None => Map::new(),
        Some(LoggableValue::ErrorLike(err)) => {
            let mut map = Map::new();
            map.insert("error".into(), err.into());
            map
        }
        Some(LoggableValue::Object(mut map)) => {
            for value in map.values_mut() {
                if let Some(err) = ErrorInfo::detect(value) {
                    *value = err.into();
                }
            }
            map
        }
        Some(LoggableValue::Scalar(value)) => {
            let mut map = Map::new();
            map.insert("data".into(), value);
            map
        }
    };
    body.insert(MESSAGE_FIELD.into(), Value::String(message.to_string()));

    object_body(body)
}

/// Encode a map and drop the outer braces.
pub(crate) fn object_body(map: Map<String, Value>) -> String {
    let encoded = Value::Object(map).to_string();
    encoded[1..encoded.len() - 1].to_string()
}

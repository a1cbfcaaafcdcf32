//! Tolerant decoding of tool-call argument strings.

use crate::types::JsonObject;
use serde_json::Value;

/// Decode a raw argument string into a JSON object.
///
/// Blank input yields an empty object. Anything that is not a JSON object is
/// kept verbatim under `"raw"` instead of failing the response.
pub fn parse_args(raw: &str) -> JsonObject {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return JsonObject::new();
    }

    match serde_json::from_str::<JsonObject>(trimmed) {
        Ok(args) => args,
        Err(err) => {
            tracing::warn!(error = %err, "tool arguments are not a JSON object, keeping raw text");
            raw_args(raw)
        }
    }
}

/// Like [`parse_args`], but a non-object JSON value is wrapped under
/// `"value"`. Returns the decode error message when the input was not JSON.
pub fn parse_args_lenient(raw: &str) -> (JsonObject, Option<String>) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return (JsonObject::new(), None);
    }

    let object_err = match serde_json::from_str::<JsonObject>(trimmed) {
        Ok(args) => return (args, None),
        Err(err) => err,
    };

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => {
            let mut args = JsonObject::new();
            args.insert("value".to_string(), value);
            (args, None)
        }
        Err(_) => {
            tracing::warn!(
                error = %object_err,
                "tool arguments are not valid JSON, keeping raw text"
            );
            (raw_args(raw), Some(object_err.to_string()))
        }
    }
}

fn raw_args(raw: &str) -> JsonObject {
    let mut args = JsonObject::new();
    args.insert("raw".to_string(), Value::String(raw.to_string()));
    args
}

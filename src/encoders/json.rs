//! Plain-mode encoder: one JSON object per line

use super::{fields_object, format_timestamp, Encoder};
use crate::core::{Entry, Field, Result};
use serde_json::Value;

pub const LEVEL_KEY: &str = "level";
pub const TIME_KEY: &str = "ts";
pub const CALLER_KEY: &str = "caller";
pub const MESSAGE_KEY: &str = "msg";

/// Keys written by the encoder itself; fields never replace them
pub const METADATA_KEYS: [&str; 4] = [LEVEL_KEY, TIME_KEY, CALLER_KEY, MESSAGE_KEY];

/// Prefix given to a field whose key collides with a metadata key
pub const COLLISION_PREFIX: &str = "fields.";

/// Encodes each record as a single-line JSON object (JSONL)
///
/// Metadata keys come first (`level`, `ts`, `caller`, `msg`), followed by the
/// fields in the order they were added. A field named like a metadata key is
/// written as `fields.<key>` so it cannot overwrite the record's own metadata.
///
/// # Example output
///
/// ```text
/// {"level":"INFO","ts":"2024-03-10T00:00:00.000+0800","caller":"src/main.rs:12","msg":"started","port":8080}
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEncoder;

impl JsonEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder for JsonEncoder {
    fn encode_entry(&self, entry: &Entry<'_>, context: &[Field], fields: &[Field]) -> Result<String> {
        let mut obj = serde_json::Map::new();
        obj.insert(LEVEL_KEY.to_string(), Value::String(entry.level.to_str().to_string()));
        obj.insert(TIME_KEY.to_string(), Value::String(format_timestamp(entry)));
        if let Some(caller) = entry.caller_str() {
            obj.insert(CALLER_KEY.to_string(), Value::String(caller));
        }
        obj.insert(MESSAGE_KEY.to_string(), Value::String(entry.message.to_string()));
        for (key, value) in fields_object(context, fields) {
            if METADATA_KEYS.contains(&key.as_str()) {
                obj.insert(format!("{}{}", COLLISION_PREFIX, key), value);
            } else {
                obj.insert(key, value);
            }
        }

        let mut line = serde_json::to_string(&Value::Object(obj))?;
        line.push('\n');
        Ok(line)
    }

    fn name(&self) -> &str {
        "json"
    }
}

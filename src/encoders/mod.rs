//! Encoders turning an entry and its fields into one output line
//!
//! - [`JsonEncoder`]: canonical line-delimited JSON (plain mode)
//! - [`ConsoleEncoder`]: tab-delimited human layout, fields as a trailing JSON object
//! - [`ColorConsoleEncoder`]: wraps a console encoder and colorizes the field segment (pretty mode)

pub mod color;
pub mod console;
pub mod json;

pub use color::ColorConsoleEncoder;
pub use console::ConsoleEncoder;
pub use json::JsonEncoder;

use crate::core::{Entry, Field, Result, ISO8601_FORMAT};
use serde_json::{Map, Value};

/// Renders one record into a newline-terminated line
pub trait Encoder: Send + Sync {
    /// `context` holds the logger's fixed fields, `fields` the event's own.
    /// Both are emitted in order; on duplicate keys the later one wins.
    fn encode_entry(&self, entry: &Entry<'_>, context: &[Field], fields: &[Field]) -> Result<String>;

    fn name(&self) -> &str;
}

/// Format a record timestamp: `2024-03-10T00:00:00.000+0800`
pub(crate) fn format_timestamp(entry: &Entry<'_>) -> String {
    entry.time.format(ISO8601_FORMAT).to_string()
}

/// Collect fields into an insertion-ordered JSON object
pub(crate) fn fields_object(context: &[Field], fields: &[Field]) -> Map<String, Value> {
    let mut obj = Map::with_capacity(context.len() + fields.len());
    for field in context.iter().chain(fields) {
        obj.insert(field.key.to_string(), field.value.to_json_value());
    }
    obj
}

//! Tab-delimited console encoder

use super::{fields_object, format_timestamp, Encoder};
use crate::core::{Entry, Field, Result};
use colored::Colorize;

/// Human-oriented line layout:
///
/// ```text
/// 2024-03-10T09:15:00.000+0800\tINFO\tsrc/main.rs:12\tstarted\t{"port":8080}
/// ```
///
/// The caller segment is present only when known; the trailing JSON object
/// only when the record carries fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleEncoder {
    color_level: bool,
}

impl ConsoleEncoder {
    pub fn new() -> Self {
        Self { color_level: false }
    }

    /// Render the level token in its severity color
    #[must_use]
    pub fn with_color_level(mut self, color_level: bool) -> Self {
        self.color_level = color_level;
        self
    }
}

impl Encoder for ConsoleEncoder {
    fn encode_entry(&self, entry: &Entry<'_>, context: &[Field], fields: &[Field]) -> Result<String> {
        let level = if self.color_level {
            entry
                .level
                .to_str()
                .color(entry.level.color_code())
                .to_string()
        } else {
            entry.level.to_str().to_string()
        };

        let mut segments = Vec::with_capacity(5);
        segments.push(format_timestamp(entry));
        segments.push(level);
        if let Some(caller) = entry.caller_str() {
            segments.push(caller);
        }
        segments.push(entry.sanitized_message().into_owned());
        if !context.is_empty() || !fields.is_empty() {
            segments.push(serde_json::to_string(&fields_object(context, fields))?);
        }

        let mut line = segments.join("\t");
        line.push('\n');
        Ok(line)
    }

    fn name(&self) -> &str {
        "console"
    }
}

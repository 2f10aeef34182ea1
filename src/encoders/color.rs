//! Pretty-mode encoder: colorizes the trailing field object of a console line

use super::{ConsoleEncoder, Encoder};
use crate::core::{Entry, Field, Result};
use serde_json::{Map, Value};

pub const RED: &str = "\x1b[31m";
pub const RESET: &str = "\x1b[0m";

/// Key whose value is wrapped in [`RED`]/[`RESET`]
pub const ERROR_KEY: &str = "error";

/// Post-processes a tab-delimited line from a base encoder
///
/// The last tab segment is parsed as a JSON object and re-rendered as
/// `{"key": "value", ...}` with every value shown as a quoted string and the
/// `error` value wrapped in red. Keys keep the order the base encoder wrote
/// them in. Numbers and booleans lose their JSON type in the rendering.
///
/// Quotes, backslashes and control characters in keys and values are escaped,
/// so a field can neither break the line nor add a tab segment.
///
/// If the segment does not parse, the base line is returned untouched and a
/// diagnostic goes to stderr.
pub struct ColorConsoleEncoder {
    base: Box<dyn Encoder>,
}

impl ColorConsoleEncoder {
    pub fn new(base: Box<dyn Encoder>) -> Self {
        Self { base }
    }

    /// Rewrite the trailing field segment of `line`
    pub fn colorize(&self, line: String) -> String {
        let Some((head, trailing)) = line.rsplit_once('\t') else {
            return line;
        };

        let object: Map<String, Value> = match serde_json::from_str(trailing) {
            Ok(object) => object,
            Err(e) => {
                eprintln!(
                    "[LOGGER WARNING] Pretty encoder could not parse field segment: {}. \
                     Writing the line uncolored.",
                    e
                );
                return line;
            }
        };

        let rendered = object
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => escape(s),
                    other => escape(&other.to_string()),
                };
                if key == ERROR_KEY {
                    format!("\"{}\": \"{}{}{}\"", escape(key), RED, value, RESET)
                } else {
                    format!("\"{}\": \"{}\"", escape(key), value)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!("{}\t{{{}}}\n", head, rendered)
    }
}

/// Escape quotes, backslashes and control characters so a rendered value
/// stays inside its quotes and on one line
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

impl Default for ColorConsoleEncoder {
    fn default() -> Self {
        Self::new(Box::new(ConsoleEncoder::new().with_color_level(true)))
    }
}

impl Encoder for ColorConsoleEncoder {
    fn encode_entry(&self, entry: &Entry<'_>, context: &[Field], fields: &[Field]) -> Result<String> {
        let line = self.base.encode_entry(entry, context, fields)?;
        // Without fields the last segment is the message, not an object.
        if context.is_empty() && fields.is_empty() {
            return Ok(line);
        }
        Ok(self.colorize(line))
    }

    fn name(&self) -> &str {
        "color_console"
    }
}

//! Log entry metadata handed to encoders

use super::log_level::LogLevel;
use chrono::DateTime;
use chrono_tz::Tz;
use std::borrow::Cow;
use std::panic::Location;

/// Everything about a record except its fields
///
/// Built by the engine at emit time; borrowed by encoders.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub level: LogLevel,
    pub time: DateTime<Tz>,
    pub message: &'a str,
    pub caller: Option<&'static Location<'static>>,
}

impl<'a> Entry<'a> {
    pub fn new(level: LogLevel, time: DateTime<Tz>, message: &'a str) -> Self {
        Self {
            level,
            time,
            message,
            caller: None,
        }
    }

    pub fn with_caller(mut self, caller: &'static Location<'static>) -> Self {
        self.caller = Some(caller);
        self
    }

    /// `file:line` of the call site, if known
    pub fn caller_str(&self) -> Option<String> {
        self.caller
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
    }

    /// Message with line and segment delimiters escaped
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences so
    /// that one record stays one line and the tab-delimited console layout
    /// stays parseable.
    pub fn sanitized_message(&self) -> Cow<'a, str> {
        if self.message.contains(['\n', '\r', '\t']) {
            Cow::Owned(
                self.message
                    .replace('\n', "\\n")
                    .replace('\r', "\\r")
                    .replace('\t', "\\t"),
            )
        } else {
            Cow::Borrowed(self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(message: &str) -> Entry<'_> {
        let time = chrono_tz::UTC
            .with_ymd_and_hms(2024, 3, 10, 0, 0, 0)
            .unwrap();
        Entry::new(LogLevel::Info, time, message)
    }

    #[test]
    fn test_sanitize_message() {
        let e = entry("line one\nline two\tcol");
        assert_eq!(e.sanitized_message(), "line one\\nline two\\tcol");
    }

    #[test]
    fn test_sanitize_borrows_clean_message() {
        let e = entry("clean");
        assert!(matches!(e.sanitized_message(), Cow::Borrowed("clean")));
    }

    #[test]
    fn test_caller_str() {
        let e = entry("x").with_caller(Location::caller());
        let caller = e.caller_str().unwrap();
        assert!(caller.starts_with("src/core/entry.rs:"), "{}", caller);
    }
}

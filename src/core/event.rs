//! Chainable event builder

use super::{
    engine::Engine,
    field::{Field, FieldValue},
    log_level::LogLevel,
    pool::EventPool,
};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Key used by [`Event::err`]
pub const ERROR_FIELD_KEY: &str = "error";

struct EventState<'p> {
    pool: &'p EventPool,
    engine: Arc<Engine>,
    fields: Vec<Field>,
    caller: &'static Location<'static>,
}

/// One in-flight log record
///
/// Obtained from a [`Logger`](crate::Logger) or an [`EventPool`]; fields are
/// added with chained setters and the record is written by one of the terminal
/// calls [`msg`](Self::msg), [`msgf`](Self::msgf) or [`send`](Self::send).
/// Terminals consume the event and hand its buffer back to the pool, as does
/// dropping it without a terminal call (nothing is written in that case).
///
/// An event whose level is below the logger's minimum is disabled: it holds no
/// buffer and every setter is a no-op.
///
/// # Example
///
/// ```
/// use rust_event_logger::{Logger, Options};
///
/// let logger = Logger::new(Options::default().with_writer(std::io::sink())).unwrap();
/// logger
///     .info()
///     .str("user", "ada")
///     .int("attempt", 3)
///     .bool("admin", false)
///     .msg("login");
/// ```
#[must_use = "an event is only written by msg, msgf or send"]
pub struct Event<'p> {
    level: LogLevel,
    state: Option<EventState<'p>>,
}

impl<'p> Event<'p> {
    pub(crate) fn enabled(
        pool: &'p EventPool,
        engine: Arc<Engine>,
        level: LogLevel,
        fields: Vec<Field>,
        caller: &'static Location<'static>,
    ) -> Self {
        Self {
            level,
            state: Some(EventState {
                pool,
                engine,
                fields,
                caller,
            }),
        }
    }

    pub(crate) fn disabled(level: LogLevel) -> Self {
        Self { level, state: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Fields set so far, in insertion order
    pub fn fields(&self) -> &[Field] {
        self.state.as_ref().map_or(&[], |s| s.fields.as_slice())
    }

    pub fn len(&self) -> usize {
        self.fields().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.fields.capacity())
    }

    /// Source location the event was created at
    pub fn caller(&self) -> Option<&'static Location<'static>> {
        self.state.as_ref().map(|s| s.caller)
    }

    #[inline]
    fn push_with<F: FnOnce() -> Field>(mut self, make: F) -> Self {
        if let Some(state) = self.state.as_mut() {
            state.fields.push(make());
        }
        self
    }

    pub fn field(self, key: impl Into<Cow<'static, str>>, value: impl Into<FieldValue>) -> Self {
        self.push_with(|| Field::new(key, value))
    }

    pub fn int(self, key: impl Into<Cow<'static, str>>, value: isize) -> Self {
        self.push_with(|| Field::new(key, FieldValue::Int(value as i64)))
    }

    pub fn int64(self, key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        self.push_with(|| Field::new(key, FieldValue::Int(value)))
    }

    pub fn float64(self, key: impl Into<Cow<'static, str>>, value: f64) -> Self {
        self.push_with(|| Field::new(key, FieldValue::Float(value)))
    }

    pub fn bool(self, key: impl Into<Cow<'static, str>>, value: bool) -> Self {
        self.push_with(|| Field::new(key, FieldValue::Bool(value)))
    }

    pub fn str(self, key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        self.push_with(|| Field::new(key, FieldValue::Str(value.into())))
    }

    pub fn time<Z: TimeZone>(self, key: impl Into<Cow<'static, str>>, value: DateTime<Z>) -> Self {
        self.push_with(|| Field::new(key, value))
    }

    /// Record an error message under the `error` key
    pub fn err(self, err: impl fmt::Display) -> Self {
        self.push_with(|| Field::new(ERROR_FIELD_KEY, FieldValue::Error(err.to_string())))
    }

    /// Record any serializable value
    ///
    /// When serialization fails, the failure message is recorded under
    /// `<key>Error` instead.
    pub fn any<T: Serialize + ?Sized>(self, key: impl Into<Cow<'static, str>>, value: &T) -> Self {
        self.push_with(|| {
            let key = key.into();
            match serde_json::to_value(value) {
                Ok(v) => Field::new(key, FieldValue::Any(v)),
                Err(e) => Field::new(format!("{}Error", key), FieldValue::Error(e.to_string())),
            }
        })
    }

    /// Write the record with `message`
    pub fn msg(self, message: &str) {
        if let Some(state) = self.state.as_ref() {
            state
                .engine
                .log(self.level, message, Some(state.caller), &state.fields);
        }
    }

    /// Write the record with a formatted message
    ///
    /// ```
    /// # use rust_event_logger::{Logger, Options};
    /// # let logger = Logger::new(Options::default().with_writer(std::io::sink())).unwrap();
    /// let port = 8080;
    /// logger.info().msgf(format_args!("listening on {}", port));
    /// ```
    pub fn msgf(self, args: fmt::Arguments<'_>) {
        if !self.is_enabled() {
            return;
        }
        match args.as_str() {
            Some(message) => self.msg(message),
            None => self.msg(&args.to_string()),
        }
    }

    /// Write the record with an empty message
    pub fn send(self) {
        self.msg("");
    }
}

impl Drop for Event<'_> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            let EventState { pool, fields, .. } = state;
            pool.recycle(fields);
        }
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("level", &self.level)
            .field("enabled", &self.is_enabled())
            .field("fields", &self.fields())
            .finish()
    }
}

//! Structured log engine
//!
//! Filters by level, timestamps, encodes and fans a record out to appenders.
//! Loggers and events hold the engine behind an `Arc`; deriving a child with a
//! fixed field produces a new engine sharing the same core.

use super::{
    appender::Appender,
    entry::Entry,
    error::{LoggerError, Result},
    field::Field,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    scheduler::RotationScheduler,
};
use crate::encoders::{Encoder, JsonEncoder};
use chrono::Utc;
use chrono_tz::Tz;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe, Location};
use std::sync::Arc;

/// Exit status used after a FATAL record has been written
pub const FATAL_EXIT_CODE: i32 = 1;

struct EngineCore {
    min_level: LogLevel,
    timezone: Tz,
    encoder: Box<dyn Encoder>,
    appenders: Mutex<Vec<Box<dyn Appender>>>,
    metrics: Arc<LoggerMetrics>,
    /// Stopped when the last engine sharing this core goes away
    _scheduler: Option<RotationScheduler>,
}

pub struct Engine {
    core: Arc<EngineCore>,
    context: Vec<Field>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.core.min_level
    }

    pub fn min_level(&self) -> LogLevel {
        self.core.min_level
    }

    pub fn timezone(&self) -> Tz {
        self.core.timezone
    }

    /// Fields attached to every record of this engine
    pub fn context(&self) -> &[Field] {
        &self.context
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.core.metrics
    }

    /// A new engine sharing this one's sinks, with one more fixed field
    #[must_use]
    pub fn with_field(&self, field: Field) -> Engine {
        let mut context = Vec::with_capacity(self.context.len() + 1);
        context.extend_from_slice(&self.context);
        context.push(field);
        Engine {
            core: Arc::clone(&self.core),
            context,
        }
    }

    /// Encode and write one record
    ///
    /// Never fails: encoding and appender errors are reported on stderr and
    /// counted as dropped. A FATAL record syncs every appender and exits the
    /// process.
    pub fn log(
        &self,
        level: LogLevel,
        message: &str,
        caller: Option<&'static Location<'static>>,
        fields: &[Field],
    ) {
        if !self.enabled(level) {
            return;
        }

        let mut entry = Entry::new(level, Utc::now().with_timezone(&self.core.timezone), message);
        if let Some(caller) = caller {
            entry = entry.with_caller(caller);
        }

        match self.core.encoder.encode_entry(&entry, &self.context, fields) {
            Ok(line) => self.write_line(line.as_bytes()),
            Err(e) => {
                eprintln!(
                    "[LOGGER ERROR] Encoder '{}' failed: {}",
                    self.core.encoder.name(),
                    e
                );
                self.core.metrics.record_dropped();
            }
        }

        if level == LogLevel::Fatal {
            if let Err(e) = self.sync() {
                eprintln!("[LOGGER ERROR] Failed to flush before fatal exit: {}", e);
            }
            std::process::exit(FATAL_EXIT_CODE);
        }
    }

    /// Write a line to every appender with per-appender panic isolation
    fn write_line(&self, line: &[u8]) {
        let mut appenders = self.core.appenders.lock();
        let mut has_error = false;

        for appender in appenders.iter_mut() {
            let append_result = catch_unwind(AssertUnwindSafe(|| appender.append(line)));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Appender '{}' failed: {}", appender.name(), e);
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender '{}' panicked: {}. \
                         Other appenders continue to function.",
                        appender.name(),
                        panic_message(&panic_info)
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            self.core.metrics.record_dropped();
        } else {
            self.core.metrics.record_logged();
        }
    }

    /// Flush every appender, returning the first error observed
    ///
    /// All appenders are flushed even when an earlier one fails.
    pub fn sync(&self) -> Result<()> {
        let mut appenders = self.core.appenders.lock();
        let mut first_error: Option<LoggerError> = None;

        for appender in appenders.iter_mut() {
            let flush_result = catch_unwind(AssertUnwindSafe(|| appender.flush()));
            let error = match flush_result {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(panic_info) => LoggerError::writer(format!(
                    "appender '{}' panicked during flush: {}",
                    appender.name(),
                    panic_message(&panic_info)
                )),
            };
            if first_error.is_none() {
                first_error = Some(error);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for constructing an [`Engine`]
///
/// # Example
/// ```
/// use rust_event_logger::appenders::ConsoleAppender;
/// use rust_event_logger::encoders::ConsoleEncoder;
/// use rust_event_logger::{Engine, LogLevel};
///
/// let engine = Engine::builder()
///     .min_level(LogLevel::Debug)
///     .encoder(ConsoleEncoder::new())
///     .appender(ConsoleAppender::default())
///     .build();
/// assert!(engine.enabled(LogLevel::Debug));
/// ```
pub struct EngineBuilder {
    min_level: LogLevel,
    timezone: Tz,
    encoder: Option<Box<dyn Encoder>>,
    appenders: Vec<Box<dyn Appender>>,
    metrics: Option<Arc<LoggerMetrics>>,
    scheduler: Option<RotationScheduler>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            timezone: super::options::DEFAULT_TIMEZONE,
            encoder: None,
            appenders: Vec::new(),
            metrics: None,
            scheduler: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn encoder<E: Encoder + 'static>(mut self, encoder: E) -> Self {
        self.encoder = Some(Box::new(encoder));
        self
    }

    /// Add an appender; records are written in the order appenders were added
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Share a metrics instance, e.g. with a rotation closure
    #[must_use = "builder methods return a new value"]
    pub fn metrics(mut self, metrics: Arc<LoggerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Tie a scheduler's lifetime to the engine
    #[must_use = "builder methods return a new value"]
    pub fn scheduler(mut self, scheduler: RotationScheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            core: Arc::new(EngineCore {
                min_level: self.min_level,
                timezone: self.timezone,
                encoder: self.encoder.unwrap_or_else(|| Box::new(JsonEncoder::new())),
                appenders: Mutex::new(self.appenders),
                metrics: self.metrics.unwrap_or_default(),
                _scheduler: self.scheduler,
            }),
            context: Vec::new(),
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recording(Arc<Mutex<Vec<String>>>);

    impl Appender for Recording {
        fn append(&mut self, line: &[u8]) -> Result<()> {
            self.0.lock().push(String::from_utf8_lossy(line).into_owned());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct Failing {
        flushes: Arc<Mutex<usize>>,
        message: &'static str,
    }

    impl Appender for Failing {
        fn append(&mut self, _line: &[u8]) -> Result<()> {
            Err(LoggerError::other("simulated write failure"))
        }

        fn flush(&mut self) -> Result<()> {
            *self.flushes.lock() += 1;
            Err(LoggerError::other(self.message))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct Panicking;

    impl Appender for Panicking {
        fn append(&mut self, _line: &[u8]) -> Result<()> {
            panic!("appender exploded");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn recording_engine(level: LogLevel) -> (Engine, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let engine = Engine::builder()
            .min_level(level)
            .appender(Recording(Arc::clone(&lines)))
            .build();
        (engine, lines)
    }

    #[test]
    fn test_level_filtering() {
        let (engine, lines) = recording_engine(LogLevel::Warn);
        engine.log(LogLevel::Info, "dropped", None, &[]);
        engine.log(LogLevel::Error, "kept", None, &[]);

        let lines = lines.lock();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\"msg\":\"kept\""));
    }

    #[test]
    fn test_with_field_does_not_touch_parent() {
        let (parent, lines) = recording_engine(LogLevel::Info);
        let child = parent.with_field(Field::new("component", "db"));

        child.log(LogLevel::Info, "child", None, &[]);
        parent.log(LogLevel::Info, "parent", None, &[]);

        let lines = lines.lock();
        assert!(lines[0].contains("\"component\":\"db\""));
        assert!(!lines[1].contains("component"));
        assert!(parent.context().is_empty());
    }

    #[test]
    fn test_failing_appender_does_not_block_others() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let engine = Engine::builder()
            .appender(Panicking)
            .appender(Failing {
                flushes: Arc::new(Mutex::new(0)),
                message: "unused",
            })
            .appender(Recording(Arc::clone(&lines)))
            .build();

        engine.log(LogLevel::Info, "survives", None, &[]);

        assert_eq!(lines.lock().len(), 1);
        assert_eq!(engine.metrics().dropped_count(), 1);
        assert_eq!(engine.metrics().total_logged(), 0);
    }

    #[test]
    fn test_sync_returns_first_error_and_flushes_all() {
        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));
        let engine = Engine::builder()
            .appender(Failing {
                flushes: Arc::clone(&first),
                message: "first",
            })
            .appender(Failing {
                flushes: Arc::clone(&second),
                message: "second",
            })
            .build();

        let err = engine.sync().unwrap_err();
        assert_eq!(err.to_string(), "first");
        assert_eq!(*first.lock(), 1);
        assert_eq!(*second.lock(), 1);
    }

    #[test]
    fn test_caller_is_rendered() {
        let (engine, lines) = recording_engine(LogLevel::Info);
        engine.log(LogLevel::Info, "here", Some(Location::caller()), &[]);
        assert!(lines.lock()[0].contains("\"caller\":\"src/core/engine.rs:"));
    }
}

//! Logger facade
//!
//! Binds options, the engine, the event pool and an optional context hook into
//! a cheap-to-clone handle with one event constructor per level.

use super::{
    context::{CtxHook, RequestContext},
    engine::Engine,
    error::Result,
    event::Event,
    field::{Field, FieldValue},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    options::Options,
    pool::EventPool,
    scheduler::RotationScheduler,
};
use crate::appenders::{ConsoleAppender, RotatingFileAppender};
use crate::encoders::{ColorConsoleEncoder, JsonEncoder};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Structured logger
///
/// Cloning is cheap and the clone shares the engine. [`with`](Self::with)
/// derives an independent child carrying one more fixed field.
///
/// # Example
///
/// ```
/// use rust_event_logger::{Logger, Options, RequestContext};
/// use std::collections::HashMap;
///
/// let mut logger = Logger::new(Options::default().with_writer(std::io::sink())).unwrap();
/// logger.add_ctx_hook(|ctx: &RequestContext| {
///     let mut fields = HashMap::new();
///     if let Some(id) = ctx.value("request_id") {
///         fields.insert("request_id".to_string(), id.clone());
///     }
///     fields
/// });
///
/// let ctx = RequestContext::new().with_value("request_id", "r-17");
/// logger.info_ctx(&ctx).str("route", "/orders").msg("handled");
///
/// let db = logger.with("component", "db");
/// db.warn().int("latency_ms", 250).msg("slow query");
/// ```
#[derive(Clone)]
pub struct Logger {
    engine: Arc<Engine>,
    options: Options,
    ctx_hook: Option<CtxHook>,
}

impl Logger {
    /// Build a logger from `options`
    ///
    /// With an empty filename only the console sink is used. Otherwise the
    /// file at `dir/filename` is opened (creating `dir`), preceded by the
    /// console sink unless it is disabled, and a midnight scheduler is started
    /// when daily rotation is enabled.
    ///
    /// # Errors
    ///
    /// Returns error if the options are invalid, the log file cannot be opened
    /// or the scheduler thread cannot be spawned
    pub fn new(options: Options) -> Result<Self> {
        options.validate()?;
        let metrics = Arc::new(LoggerMetrics::new());
        let mut builder = Engine::builder()
            .min_level(options.level)
            .timezone(options.timezone)
            .metrics(Arc::clone(&metrics));

        builder = if options.pretty {
            builder.encoder(ColorConsoleEncoder::default())
        } else {
            builder.encoder(JsonEncoder::new())
        };

        if !options.file_enabled() || !options.disable_console {
            builder = builder.appender(ConsoleAppender::new(options.writer.clone()));
        }

        if options.file_enabled() {
            let file = RotatingFileAppender::new(options.file_path(), options.rotation_policy())?;

            if options.daily_rotation {
                let rotating = file.clone();
                let failures = Arc::clone(&metrics);
                let scheduler = RotationScheduler::spawn(options.timezone, move || {
                    rotating.rotate().inspect_err(|_| {
                        failures.record_rotation_failure();
                    })
                })?;
                builder = builder.scheduler(scheduler);
            }

            builder = builder.appender(file);
        }

        Ok(Self::from_engine(builder.build(), options))
    }

    /// Console-only logger; cannot fail
    pub(crate) fn console(options: Options) -> Self {
        let options = Options {
            filename: String::new(),
            daily_rotation: false,
            ..options
        };
        let builder = Engine::builder()
            .min_level(options.level)
            .timezone(options.timezone)
            .appender(ConsoleAppender::new(options.writer.clone()));
        let engine = if options.pretty {
            builder.encoder(ColorConsoleEncoder::default()).build()
        } else {
            builder.encoder(JsonEncoder::new()).build()
        };
        Self::from_engine(engine, options)
    }

    /// Wrap an engine assembled by hand
    pub fn from_engine(engine: Engine, options: Options) -> Self {
        Self {
            engine: Arc::new(engine),
            options,
            ctx_hook: None,
        }
    }

    /// Event at `level`; disabled when the level is filtered out
    #[track_caller]
    pub fn event(&self, level: LogLevel) -> Event<'static> {
        if !self.engine.enabled(level) {
            return Event::disabled(level);
        }
        EventPool::global().acquire(&self.engine, level)
    }

    #[track_caller]
    fn event_ctx(&self, level: LogLevel, ctx: &RequestContext) -> Event<'static> {
        let event = self.event(level);
        match &self.ctx_hook {
            Some(hook) if event.is_enabled() => hook
                .fields(ctx)
                .into_iter()
                .fold(event, |event, (key, value)| event.field(key, value)),
            _ => event,
        }
    }

    #[track_caller]
    pub fn debug(&self) -> Event<'static> {
        self.event(LogLevel::Debug)
    }

    #[track_caller]
    pub fn info(&self) -> Event<'static> {
        self.event(LogLevel::Info)
    }

    #[track_caller]
    pub fn warn(&self) -> Event<'static> {
        self.event(LogLevel::Warn)
    }

    #[track_caller]
    pub fn error(&self) -> Event<'static> {
        self.event(LogLevel::Error)
    }

    /// FATAL event; emitting it flushes all sinks and exits the process
    #[track_caller]
    pub fn fatal(&self) -> Event<'static> {
        self.event(LogLevel::Fatal)
    }

    #[track_caller]
    pub fn debug_ctx(&self, ctx: &RequestContext) -> Event<'static> {
        self.event_ctx(LogLevel::Debug, ctx)
    }

    #[track_caller]
    pub fn info_ctx(&self, ctx: &RequestContext) -> Event<'static> {
        self.event_ctx(LogLevel::Info, ctx)
    }

    #[track_caller]
    pub fn warn_ctx(&self, ctx: &RequestContext) -> Event<'static> {
        self.event_ctx(LogLevel::Warn, ctx)
    }

    #[track_caller]
    pub fn error_ctx(&self, ctx: &RequestContext) -> Event<'static> {
        self.event_ctx(LogLevel::Error, ctx)
    }

    #[track_caller]
    pub fn fatal_ctx(&self, ctx: &RequestContext) -> Event<'static> {
        self.event_ctx(LogLevel::Fatal, ctx)
    }

    /// INFO record whose message is `value`'s display form
    #[track_caller]
    pub fn println(&self, value: impl fmt::Display) {
        let event = self.info();
        if event.is_enabled() {
            event.msg(&value.to_string());
        }
    }

    /// INFO record with a formatted message
    #[track_caller]
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.info().msgf(args);
    }

    /// Child logger attaching `key = value` to every record
    ///
    /// The child keeps this logger's context hook; the parent is unchanged.
    #[must_use]
    pub fn with(&self, key: impl Into<Cow<'static, str>>, value: impl Into<FieldValue>) -> Logger {
        Logger {
            engine: Arc::new(self.engine.with_field(Field::new(key, value))),
            options: self.options.clone(),
            ctx_hook: self.ctx_hook.clone(),
        }
    }

    /// Register the hook used by the `*_ctx` constructors, replacing any previous one
    pub fn add_ctx_hook<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&RequestContext) -> HashMap<String, FieldValue> + Send + Sync + 'static,
    {
        self.ctx_hook = Some(CtxHook::new(hook));
        self
    }

    pub fn ctx_hook(&self) -> Option<&CtxHook> {
        self.ctx_hook.as_ref()
    }

    /// Flush every sink, returning the first error observed
    pub fn sync(&self) -> Result<()> {
        self.engine.sync()
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        self.engine.enabled(level)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.engine.metrics()
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::console(Options::default())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.engine.min_level())
            .field("options", &self.options)
            .field("ctx_hook", &self.ctx_hook.is_some())
            .finish()
    }
}

//! Process-wide default logger
//!
//! The default starts as a console-only JSON logger on stdout and can be
//! replaced with [`init`]. Replacement is an atomic pointer swap: a call racing
//! with `init` uses either the old or the new logger, never a mix. Loggers
//! handed out before the swap keep working.
//!
//! ```
//! use rust_event_logger::{global, Options};
//!
//! global::init(Options::default().with_writer(std::io::sink())).unwrap();
//! global::info().str("service", "billing").msg("started");
//! global::sync().unwrap();
//! ```

use crate::core::{
    Event, FieldValue, LogLevel, Logger, Options, RequestContext, Result,
};
use arc_swap::ArcSwap;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

static DEFAULT: LazyLock<ArcSwap<Logger>> =
    LazyLock::new(|| ArcSwap::from_pointee(Logger::default()));

/// Replace the default logger with one built from `options`
///
/// # Errors
///
/// Returns error if the logger cannot be built; the current default is kept
pub fn init(options: Options) -> Result<()> {
    let logger = Logger::new(options)?;
    DEFAULT.store(Arc::new(logger));
    Ok(())
}

/// Install an already built logger as the default
pub fn set_logger(logger: Logger) {
    DEFAULT.store(Arc::new(logger));
}

/// Snapshot of the current default logger
pub fn logger() -> Arc<Logger> {
    DEFAULT.load_full()
}

/// Set the context hook on the default logger and return the updated logger
pub fn add_ctx_hook<F>(hook: F) -> Arc<Logger>
where
    F: Fn(&RequestContext) -> HashMap<String, FieldValue> + Send + Sync + 'static,
{
    let mut updated = (*DEFAULT.load_full()).clone();
    updated.add_ctx_hook(hook);
    let updated = Arc::new(updated);
    DEFAULT.store(Arc::clone(&updated));
    updated
}

/// Child of the default logger carrying `key = value`
pub fn with(key: impl Into<Cow<'static, str>>, value: impl Into<FieldValue>) -> Logger {
    DEFAULT.load().with(key, value)
}

#[track_caller]
pub fn event(level: LogLevel) -> Event<'static> {
    DEFAULT.load().event(level)
}

#[track_caller]
pub fn debug() -> Event<'static> {
    DEFAULT.load().debug()
}

#[track_caller]
pub fn info() -> Event<'static> {
    DEFAULT.load().info()
}

#[track_caller]
pub fn warn() -> Event<'static> {
    DEFAULT.load().warn()
}

#[track_caller]
pub fn error() -> Event<'static> {
    DEFAULT.load().error()
}

#[track_caller]
pub fn fatal() -> Event<'static> {
    DEFAULT.load().fatal()
}

#[track_caller]
pub fn debug_ctx(ctx: &RequestContext) -> Event<'static> {
    DEFAULT.load().debug_ctx(ctx)
}

#[track_caller]
pub fn info_ctx(ctx: &RequestContext) -> Event<'static> {
    DEFAULT.load().info_ctx(ctx)
}

#[track_caller]
pub fn warn_ctx(ctx: &RequestContext) -> Event<'static> {
    DEFAULT.load().warn_ctx(ctx)
}

#[track_caller]
pub fn error_ctx(ctx: &RequestContext) -> Event<'static> {
    DEFAULT.load().error_ctx(ctx)
}

#[track_caller]
pub fn fatal_ctx(ctx: &RequestContext) -> Event<'static> {
    DEFAULT.load().fatal_ctx(ctx)
}

#[track_caller]
pub fn println(value: impl fmt::Display) {
    DEFAULT.load().println(value)
}

#[track_caller]
pub fn printf(args: fmt::Arguments<'_>) {
    DEFAULT.load().printf(args)
}

/// Flush the default logger's sinks
pub fn sync() -> Result<()> {
    DEFAULT.load().sync()
}

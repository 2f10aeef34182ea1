//! # Rust Event Logger
//!
//! Structured logging with a chainable event API.
//!
//! ## Features
//!
//! - **Pooled events**: field buffers are recycled through a lock-free pool
//! - **Plain and pretty output**: JSON lines, or a colorized console layout
//! - **Daily rotation**: file output rolled over at local midnight in any time zone
//! - **Context hooks**: request-scoped fields attached automatically
//!
//! ## Example
//!
//! ```
//! use rust_event_logger::{Logger, Options};
//!
//! let logger = Logger::new(Options::default().with_writer(std::io::sink())).unwrap();
//!
//! logger
//!     .info()
//!     .str("method", "GET")
//!     .int("status", 200)
//!     .msg("request served");
//!
//! logger.error().err("connection reset").send();
//! logger.sync().unwrap();
//! ```

pub mod appenders;
pub mod core;
pub mod encoders;
pub mod global;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, RotatingFileAppender, RotationPolicy, SharedWriter};
    pub use crate::core::{
        Appender, CtxHook, Engine, EngineBuilder, Entry, Event, EventPool, Field, FieldValue, LogLevel,
        Logger, LoggerError, LoggerMetrics, Options, PoolMetrics, RequestContext, Result,
        RotationScheduler,
    };
    pub use crate::encoders::{ColorConsoleEncoder, ConsoleEncoder, Encoder, JsonEncoder};
}

pub use crate::appenders::{ConsoleAppender, RotatingFileAppender, RotationPolicy, SharedWriter};
pub use crate::core::{
    Appender, CtxHook, Engine, EngineBuilder, Entry, Event, EventPool, Field, FieldValue,
    LogLevel, Logger, LoggerError, LoggerMetrics, Options, PoolMetrics, RequestContext, Result,
    RotationScheduler, ISO8601_FORMAT,
};
pub use crate::encoders::{ColorConsoleEncoder, ConsoleEncoder, Encoder, JsonEncoder};

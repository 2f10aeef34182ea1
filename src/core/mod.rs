//! Core logger types and traits

pub mod appender;
pub mod context;
pub mod engine;
pub mod entry;
pub mod error;
pub mod event;
pub mod field;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod options;
pub mod pool;
pub mod scheduler;

pub use appender::Appender;
pub use context::{CtxHook, RequestContext};
pub use engine::{Engine, EngineBuilder, FATAL_EXIT_CODE};
pub use entry::Entry;
pub use error::{LoggerError, Result};
pub use event::{Event, ERROR_FIELD_KEY};
pub use field::{Field, FieldValue, ISO8601_FORMAT};
pub use log_level::LogLevel;
pub use logger::Logger;
pub use metrics::{LoggerMetrics, PoolMetrics};
pub use options::{
    Options, DEFAULT_MAX_AGE, DEFAULT_MAX_SIZE, DEFAULT_SKIP_LEVEL, DEFAULT_TIMEZONE,
};
pub use pool::{EventPool, DEFAULT_POOL_CAPACITY, INITIAL_FIELD_CAPACITY};
pub use scheduler::{
    duration_until_next_midnight, next_midnight, RotationScheduler, BOUNDARY_EPSILON,
};

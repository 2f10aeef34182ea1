//! Logger configuration

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use crate::appenders::{RotationPolicy, SharedWriter};
use chrono_tz::Tz;
use std::io::Write;
use std::path::PathBuf;

pub const DEFAULT_SKIP_LEVEL: usize = 1;
pub const DEFAULT_MAX_SIZE: u64 = 20;
pub const DEFAULT_MAX_AGE: u32 = 15;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Shanghai;

/// Settings used to construct a [`Logger`](crate::Logger)
///
/// Every `with_*` method returns an updated copy; the receiver is consumed, so
/// clone first to keep the original around.
///
/// The default is console-only output to stdout in plain JSON, INFO and above,
/// with midnight computed in Asia/Shanghai.
///
/// # Example
///
/// ```
/// use rust_event_logger::Options;
///
/// let options = Options::default()
///     .with_dir("/var/log/billing")
///     .with_filename("billing.log")
///     .with_daily_rotation(true)
///     .with_timezone(chrono_tz::Europe::Berlin);
///
/// assert!(options.file_enabled());
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory of the log file
    pub dir: PathBuf,
    /// Log file name; empty means console only
    pub filename: String,
    /// Suppress console output while a file is configured
    pub disable_console: bool,
    /// Rotate the log file at every local midnight
    pub daily_rotation: bool,
    /// Rollover size in megabytes; 0 falls back to [`DEFAULT_MAX_SIZE`]
    pub max_size: u64,
    /// Backup retention in days; 0 keeps backups forever
    pub max_age: u32,
    /// Stack frames between the user call site and the facade.
    ///
    /// Call sites are resolved with `#[track_caller]`, which always reports the
    /// first frame outside this crate; the value is kept for callers that
    /// inspect the configuration.
    pub skip_level: usize,
    /// Zone used for timestamps and midnight computation
    pub timezone: Tz,
    /// Console output stream
    pub writer: SharedWriter,
    /// Colorized console rendering instead of JSON lines
    pub pretty: bool,
    /// Minimum enabled severity
    pub level: LogLevel,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dir: PathBuf::new(),
            filename: String::new(),
            disable_console: false,
            daily_rotation: false,
            max_size: DEFAULT_MAX_SIZE,
            max_age: DEFAULT_MAX_AGE,
            skip_level: DEFAULT_SKIP_LEVEL,
            timezone: DEFAULT_TIMEZONE,
            writer: SharedWriter::stdout(),
            pretty: false,
            level: LogLevel::Info,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_disable_console(mut self, disable: bool) -> Self {
        self.disable_console = disable;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_daily_rotation(mut self, rotation: bool) -> Self {
        self.daily_rotation = rotation;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, megabytes: u64) -> Self {
        self.max_size = megabytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, days: u32) -> Self {
        self.max_age = days;
        self
    }

    /// Has no effect on the reported caller.
    ///
    /// Call sites come from `#[track_caller]`, which always resolves to the
    /// first frame outside this crate. The value is only stored.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_skip_level(mut self, level: usize) -> Self {
        self.skip_level = level;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.writer = SharedWriter::new(writer);
        self
    }

    /// Use an existing shared stream, e.g. one also used by another logger
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_shared_writer(mut self, writer: SharedWriter) -> Self {
        self.writer = writer;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn file_enabled(&self) -> bool {
        !self.filename.is_empty()
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }

    /// Reject settings that cannot describe a log file
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] when the filename contains
    /// a path separator; the directory belongs in `dir`.
    pub fn validate(&self) -> Result<()> {
        if self.filename.contains(['/', '\\']) {
            return Err(LoggerError::config(
                "Options",
                format!("filename '{}' contains a path separator", self.filename),
            ));
        }
        Ok(())
    }

    /// Rollover limits for the file sink, with defaults applied
    pub fn rotation_policy(&self) -> RotationPolicy {
        let max_size = if self.max_size == 0 {
            DEFAULT_MAX_SIZE
        } else {
            self.max_size
        };
        RotationPolicy::new()
            .with_max_size(max_size)
            .with_max_age(self.max_age)
    }
}

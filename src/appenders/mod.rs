//! Appender implementations

pub mod console;
pub mod rotating_file;

pub use console::{ConsoleAppender, SharedWriter};
pub use rotating_file::{RotatingFileAppender, RotationPolicy};

pub use crate::core::Appender;

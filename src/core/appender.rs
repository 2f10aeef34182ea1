//! Appender trait for log output destinations

use super::error::Result;

/// Byte sink receiving fully encoded lines
pub trait Appender: Send {
    fn append(&mut self, line: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

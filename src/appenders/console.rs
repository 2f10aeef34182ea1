//! Console appender writing to a shared output stream

use crate::core::{Appender, Result};
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// Cloneable handle to an output stream
///
/// Every clone writes to the same underlying stream; each line is written
/// under one lock so concurrent loggers never interleave within a line.
#[derive(Clone)]
pub struct SharedWriter(Arc<Mutex<Box<dyn Write + Send>>>);

impl SharedWriter {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self(Arc::new(Mutex::new(Box::new(writer))))
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    pub fn write_line(&self, line: &[u8]) -> io::Result<()> {
        self.0.lock().write_all(line)
    }

    pub fn flush(&self) -> io::Result<()> {
        self.0.lock().flush()
    }
}

impl Default for SharedWriter {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for SharedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedWriter")
    }
}

pub struct ConsoleAppender {
    writer: SharedWriter,
}

impl ConsoleAppender {
    pub fn new(writer: SharedWriter) -> Self {
        Self { writer }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new(SharedWriter::stdout())
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, line: &[u8]) -> Result<()> {
        self.writer.write_line(line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

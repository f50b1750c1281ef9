//! Destinations an [`OutputSink`](crate::OutputSink) writes to
//!
//! Only `print` is required. The probes and `flush` are optional
//! capabilities: a target that lacks one reports `None` or
//! [`SinkError::NotSupported`].

use crate::error::{SinkError, SinkResult};
use parking_lot::Mutex;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

/// Underlying writable destination
pub trait Target {
    /// Write `text` as is
    fn print(&mut self, text: &str) -> io::Result<()>;

    /// Interactivity probe; `None` when the target has none
    fn is_interactive(&self) -> Option<bool> {
        None
    }

    /// Terminal size as `(rows, cols)`; `None` when unknown
    fn size(&self) -> Option<(u16, u16)> {
        None
    }

    /// Flush buffered output
    fn flush(&mut self) -> SinkResult<()> {
        Err(SinkError::not_supported("flush"))
    }
}

impl<T: Target + ?Sized> Target for Box<T> {
    fn print(&mut self, text: &str) -> io::Result<()> {
        (**self).print(text)
    }

    fn is_interactive(&self) -> Option<bool> {
        (**self).is_interactive()
    }

    fn size(&self) -> Option<(u16, u16)> {
        (**self).size()
    }

    fn flush(&mut self) -> SinkResult<()> {
        (**self).flush()
    }
}

/// Process stdout
#[derive(Debug)]
pub struct StdoutTarget {
    stdout: io::Stdout,
}

impl StdoutTarget {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdoutTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl Target for StdoutTarget {
    fn print(&mut self, text: &str) -> io::Result<()> {
        self.stdout.lock().write_all(text.as_bytes())
    }

    fn is_interactive(&self) -> Option<bool> {
        Some(self.stdout.is_terminal())
    }

    fn size(&self) -> Option<(u16, u16)> {
        if !self.stdout.is_terminal() {
            return None;
        }
        crossterm::terminal::size()
            .ok()
            .map(|(cols, rows)| (rows, cols))
    }

    fn flush(&mut self) -> SinkResult<()> {
        self.stdout.flush()?;
        Ok(())
    }
}

/// Any [`io::Write`] implementor, without probes
#[derive(Debug)]
pub struct WriterTarget<W: Write> {
    writer: W,
}

impl<W: Write> WriterTarget<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Target for WriterTarget<W> {
    fn print(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> SinkResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory capture
///
/// Clones share the buffer, so a test can keep one handle and give the other
/// to a sink. Has no probes and no `flush`.
#[derive(Debug, Clone, Default)]
pub struct BufferTarget {
    buffer: Arc<Mutex<String>>,
}

impl BufferTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything printed so far
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Drain the buffer
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buffer.lock())
    }
}

impl Target for BufferTarget {
    fn print(&mut self, text: &str) -> io::Result<()> {
        self.buffer.lock().push_str(text);
        Ok(())
    }
}

//! Line-oriented output sink
//!
//! Normalizes heterogeneous writes into text, strips color when the session
//! has it disabled, and forwards the result to a [`Target`].

use crate::color::{strip_color, ColorSource};
use crate::error::SinkResult;
use crate::target::{StdoutTarget, Target};
use std::borrow::Cow;
use std::fmt;
use strata_config::Value;
use tracing::trace;

/// `(rows, cols)` reported when nothing else knows the terminal size
pub const DEFAULT_SIZE: (u16, u16) = (27, 80);

/// Output stream wrapper for an interactive session
pub struct OutputSink<T: Target = StdoutTarget> {
    target: T,
    color: Box<dyn ColorSource>,
}

impl OutputSink<StdoutTarget> {
    /// Sink writing to process stdout
    pub fn stdout(color: impl ColorSource + 'static) -> Self {
        Self::new(StdoutTarget::new(), color)
    }
}

impl<T: Target> OutputSink<T> {
    pub fn new(target: T, color: impl ColorSource + 'static) -> Self {
        Self {
            target,
            color: Box::new(color),
        }
    }

    /// Write each item on its own line
    ///
    /// With no items a single newline is written. Lists are flattened, an
    /// empty list also producing a newline. Every other item is rendered,
    /// loses one trailing newline if it has one, and gains exactly one.
    pub fn write_line(&mut self, items: &[Value]) -> SinkResult<()> {
        if items.is_empty() {
            return self.print("\n");
        }
        for item in items {
            match item.clone().resolve() {
                Value::List(nested) => self.write_line(&nested)?,
                other => {
                    let text = other.to_string();
                    let text = text.strip_suffix('\n').unwrap_or(&text);
                    self.print(&format!("{text}\n"))?;
                }
            }
        }
        Ok(())
    }

    /// Write each item rendered as text, without separators
    pub fn write(&mut self, items: &[Value]) -> SinkResult<()> {
        for item in items {
            self.print(&item.to_string())?;
        }
        Ok(())
    }

    /// Write a single string, stripping color when disabled
    pub fn print(&mut self, text: &str) -> SinkResult<()> {
        let text = self.decolorize(text);
        self.target.print(&text)?;
        Ok(())
    }

    /// Returns `text` untouched while color is enabled, stripped otherwise
    ///
    /// The color source is consulted on every call.
    pub fn decolorize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.color.color_enabled() {
            Cow::Borrowed(text)
        } else {
            trace!("color disabled, stripping ANSI sequences");
            strip_color(text)
        }
    }

    /// True only if the target has an interactivity probe that says so
    pub fn is_interactive(&self) -> bool {
        self.target.is_interactive().unwrap_or(false)
    }

    /// Forward a flush to the target
    ///
    /// # Errors
    ///
    /// `NotSupported` if the target cannot flush.
    pub fn flush(&mut self) -> SinkResult<()> {
        self.target.flush().map_err(|e| {
            trace!(category = e.category(), "flush not forwarded");
            e
        })
    }

    /// Terminal size as `(rows, cols)`
    ///
    /// Asks the target first, then `LINES`/`ROWS` and `COLUMNS`, then falls
    /// back to [`DEFAULT_SIZE`]. Zero dimensions count as unknown.
    pub fn size(&self) -> (u16, u16) {
        self.target
            .size()
            .filter(|(rows, cols)| *rows != 0 && *cols != 0)
            .or_else(env_size)
            .unwrap_or(DEFAULT_SIZE)
    }

    pub fn height(&self) -> u16 {
        self.size().0
    }

    pub fn width(&self) -> u16 {
        self.size().1
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_inner(self) -> T {
        self.target
    }
}

impl<T: Target> fmt::Write for OutputSink<T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s).map_err(|_| fmt::Error)
    }
}

impl<T: Target + fmt::Debug> fmt::Debug for OutputSink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink")
            .field("target", &self.target)
            .field("color", &self.color.color_enabled())
            .finish()
    }
}

fn env_size() -> Option<(u16, u16)> {
    let rows = env_dimension("LINES").or_else(|| env_dimension("ROWS"))?;
    let cols = env_dimension("COLUMNS")?;
    Some((rows, cols))
}

fn env_dimension(var: &str) -> Option<u16> {
    std::env::var(var)
        .ok()?
        .trim()
        .parse()
        .ok()
        .filter(|n: &u16| *n != 0)
}

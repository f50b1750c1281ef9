//! Output sink for interactive sessions
//!
//! Wraps a writable [`Target`] and normalizes writes:
//!
//! - `write_line` puts every item on its own line, flattening lists
//! - `write` forwards rendered items without adding newlines
//! - color sequences are stripped whenever the [`ColorSource`] says color is
//!   off, checked on every write
//!
//! # Example
//!
//! ```
//! use strata_config::Value;
//! use strata_output::{BufferTarget, OutputSink};
//!
//! let buffer = BufferTarget::new();
//! let mut out = OutputSink::new(buffer.clone(), false);
//! out.write_line(&[Value::from("\x1b[32mready\x1b[0m\n")])?;
//! assert_eq!(buffer.contents(), "ready\n");
//! # Ok::<(), strata_output::SinkError>(())
//! ```

pub mod color;
pub mod error;
pub mod sink;
pub mod target;

// Re-exports for convenience
pub use color::{strip_color, ColorFlag, ColorSource};
pub use error::{SinkError, SinkResult};
pub use sink::{OutputSink, DEFAULT_SIZE};
pub use target::{BufferTarget, StdoutTarget, Target, WriterTarget};

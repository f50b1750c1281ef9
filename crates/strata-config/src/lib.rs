//! # Strata Configuration Library
//!
//! Chained configuration layers for interactive sessions. A session layer
//! answers lookups from its own entries first and falls back along a chain of
//! default layers that ends in the factory defaults.
//!
//! ## Features
//!
//! - Default chaining with attribute-style pinning and forget bubble-down
//! - Lazy values evaluated on every read
//! - Recursive construction from mappings, TOML, and serializable structs
//! - A statically reserved key set that keeps keys and operations apart
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use strata_config::{defaults, loader};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = defaults::factory();
//!     let session = loader::resolve(&["config.toml"], &root)?;
//!     session.set("pager", false)?;
//!     println!("prompt: {}", session.attr("prompt_name"));
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

mod accessor;
mod chain;
pub mod defaults;
mod error;
pub mod loader;
pub mod reserved;
mod value;

pub use chain::Config;
pub use error::{ConfigError, ConfigResult};
pub use reserved::{is_reserved, RESERVED_KEYS};
pub use value::{Lazy, Mapping, Value};

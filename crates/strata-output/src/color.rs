//! Color decisions and ANSI stripping
//!
//! A [`ColorSource`] is asked on every write, never cached, so toggling the
//! session's `color` entry takes effect on the next line printed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use strata_config::Config;

/// SGR sequences, optionally wrapped in the `\x01`/`\x02` markers readline
/// uses to hide prompt escapes
static COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x01?\x1b\[[0-9;]*m\x02?").unwrap());

/// Remove ANSI color sequences from `text`
pub fn strip_color(text: &str) -> Cow<'_, str> {
    COLOR_RE.replace_all(text, "")
}

/// Answers whether colored output is currently wanted
pub trait ColorSource: Send + Sync {
    fn color_enabled(&self) -> bool;
}

impl ColorSource for bool {
    fn color_enabled(&self) -> bool {
        *self
    }
}

/// Reads the `color` entry through the default chain; anything but a
/// boolean `true` disables color
impl ColorSource for Config {
    fn color_enabled(&self) -> bool {
        self.get("color").as_bool().unwrap_or(false)
    }
}

/// Shared on/off switch
#[derive(Debug, Clone, Default)]
pub struct ColorFlag(Arc<AtomicBool>);

impl ColorFlag {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }
}

impl ColorSource for ColorFlag {
    fn color_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::Lazy as LazyValue;
    use strata_config::Value;

    #[test]
    fn test_strip_color() {
        assert_eq!(strip_color("\x1b[31mred\x1b[0m"), "red");
        assert_eq!(strip_color("\x1b[1;34mbold blue\x1b[0m!"), "bold blue!");
        assert_eq!(strip_color("\x01\x1b[32m\x02> "), "> ");
        assert_eq!(strip_color("plain"), "plain");
    }

    #[test]
    fn test_strip_color_borrows_plain_text() {
        assert!(matches!(strip_color("nothing to do"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_color_flag_is_shared() {
        let flag = ColorFlag::new(true);
        let other = flag.clone();
        other.set(false);
        assert!(!flag.color_enabled());
    }

    #[test]
    fn test_config_color_source() {
        let root = Config::new();
        root.set("color", true).unwrap();
        let session = Config::with_default(&root);
        assert!(session.color_enabled());

        session.set("color", "yes").unwrap();
        assert!(!session.color_enabled());

        session.set("color", LazyValue::new(|| Value::Bool(true))).unwrap();
        assert!(session.color_enabled());

        assert!(!Config::new().color_enabled());
    }
}

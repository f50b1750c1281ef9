//! Factory defaults for a REPL session
//!
//! The root layer every session chain ends in. Entries that depend on the
//! environment are lazy, so they track changes to it instead of freezing
//! whatever was true at startup.

use crate::chain::Config;
use crate::value::{Lazy, Value};
use std::io::IsTerminal;

/// Fallback when neither `VISUAL` nor `EDITOR` is set
pub const DEFAULT_EDITOR: &str = "vi";

/// Build the factory default layer
pub fn factory() -> Config {
    let history = Config::new();
    history.insert("should_save", Value::Bool(true));
    history.insert("should_load", Value::Bool(true));
    history.insert("file", Value::Lazy(Lazy::new(history_file)));

    let root = Config::new();
    root.insert("prompt_name", Value::from("strata"));
    root.insert("output_prefix", Value::from("=> "));
    root.insert("command_prefix", Value::from(""));
    root.insert("pager", Value::Bool(true));
    root.insert("quiet", Value::Bool(false));
    root.insert("auto_indent", Value::Bool(true));
    root.insert("should_load_rc", Value::Bool(true));
    root.insert("default_window_size", Value::Integer(5));
    root.insert("memory_size", Value::Integer(100));
    root.insert("requires", Value::List(Vec::new()));
    root.insert(
        "color",
        Value::Lazy(Lazy::new(|| Value::Bool(color_supported()))),
    );
    root.insert(
        "editor",
        Value::Lazy(Lazy::new(|| Value::String(default_editor()))),
    );
    root.insert("history", Value::Config(history));
    root
}

/// Whether the environment allows ANSI colors on stdout
///
/// Disabled by `NO_COLOR` (<https://no-color.org/>), `TERM=dumb`, or a
/// non-terminal stdout.
pub fn color_supported() -> bool {
    color_allowed(std::io::stdout().is_terminal())
}

fn color_allowed(is_terminal: bool) -> bool {
    let is_dumb_term = std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false);
    is_terminal && !is_dumb_term && std::env::var_os("NO_COLOR").is_none()
}

/// `VISUAL`, then `EDITOR`, then [`DEFAULT_EDITOR`]
pub fn default_editor() -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

fn history_file() -> Value {
    let path = match dirs::data_dir() {
        Some(dir) => dir.join("strata").join("history"),
        None => ".strata_history".into(),
    };
    Value::String(path.display().to_string())
}

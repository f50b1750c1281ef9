//! Command implementations
//!
//! Every command writes through an [`OutputSink`], so color handling follows
//! the session's `color` entry (or `--no-color`).

use crate::cli::{Cli, Commands};
use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use strata_config::{defaults, loader, Config, Value};
use strata_output::{OutputSink, Target};
use tracing::debug;

const KEY_COLOR: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Stack factory defaults, config files, and a session layer
pub fn build_session(cli: &Cli) -> Result<Config> {
    let paths = if cli.config.is_empty() {
        loader::user_config_path().into_iter().collect()
    } else {
        for path in &cli.config {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
        }
        cli.config.clone()
    };

    let session = loader::resolve(&paths, &defaults::factory())
        .context("Failed to load configuration layers")?;
    if cli.no_color {
        session.set("color", false)?;
    }
    debug!(layers = paths.len(), "session configuration ready");
    Ok(session)
}

/// Run the selected command against `session`
pub fn run<T: Target>(cli: &Cli, session: &Config, out: &mut OutputSink<T>) -> Result<()> {
    match &cli.command {
        Commands::Get { paths } => {
            for path in paths {
                out.write_line(&[session.lookup(path)])?;
            }
        }
        Commands::Keys => {
            let keys = pin_visible_keys(session);
            out.write_line(&[Value::from(keys)])?;
        }
        Commands::Dump => {
            pin_visible_keys(session);
            print_entries(session, out)?;
        }
        Commands::Set { key, value } => {
            session
                .set(key, parse_value(value))
                .with_context(|| format!("Cannot assign '{key}'"))?;
            print_entries(session, out)?;
        }
    }

    match out.flush() {
        Err(e) if !e.is_not_supported() => Err(e.into()),
        _ => Ok(()),
    }
}

/// Pin every key stored anywhere in the chain into `session`
///
/// `eager_load` only covers the terminal default, so keys that exist only in a
/// file layer are collected by walking each link.
fn pin_visible_keys(session: &Config) -> Vec<String> {
    let mut keys = BTreeSet::new();
    let mut layer = Some(session.clone());
    while let Some(current) = layer {
        keys.extend(current.keys());
        layer = current.default_layer();
    }
    for key in &keys {
        session.attr(key);
    }
    debug!(count = keys.len(), "pinned keys from every layer");
    keys.into_iter().collect()
}

fn print_entries<T: Target>(session: &Config, out: &mut OutputSink<T>) -> Result<()> {
    for (key, value) in session.to_mapping() {
        let line = format!("{KEY_COLOR}{key}{RESET} = {}", value.resolve());
        out.write_line(&[Value::from(line)])?;
    }
    Ok(())
}

/// Parse a TOML literal, falling back to the raw text
pub fn parse_value(raw: &str) -> Value {
    match toml::from_str::<toml::Table>(&format!("value = {raw}")) {
        Ok(mut table) => table.remove("value").map_or(Value::Nil, Value::from),
        Err(_) => Value::from(raw),
    }
}

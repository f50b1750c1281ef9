//! TOML layer loading
//!
//! Layers stack in order: the factory defaults at the root, then each file
//! on top of the previous one, then an empty session layer that receives
//! runtime assignments.
//!
//! ```toml
//! # ~/.config/strata/config.toml
//! prompt_name = "dbg"
//! pager = false
//!
//! [history]
//! should_save = false
//! ```

use crate::chain::Config;
use crate::error::{ConfigError, ConfigResult};
use crate::value::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of the per-user configuration file, if a config dir exists
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("strata").join("config.toml"))
}

/// Parse a TOML document into a layer over `default`
pub fn from_toml_str(text: &str, default: Option<&Config>) -> ConfigResult<Config> {
    parse(text, Path::new("<string>"), default)
}

/// Read and parse a TOML file into a layer over `default`
pub fn load_file(path: impl AsRef<Path>, default: Option<&Config>) -> ConfigResult<Config> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&text, path, default)?;
    debug!(
        path = %path.display(),
        keys = config.keys().len(),
        "loaded configuration layer"
    );
    Ok(config)
}

/// Stack each existing file as a layer over `root`
///
/// Missing files are skipped. Returns an empty session layer on top of the
/// last loaded layer.
pub fn resolve<P: AsRef<Path>>(paths: &[P], root: &Config) -> ConfigResult<Config> {
    let mut current = root.clone();
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "skipping missing configuration layer");
            continue;
        }
        current = load_file(path, Some(&current))?;
    }
    Ok(Config::with_default(&current))
}

fn parse(text: &str, origin: &Path, default: Option<&Config>) -> ConfigResult<Config> {
    let table: toml::Table = toml::from_str(text).map_err(|e| ConfigError::Parse {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })?;
    Config::from_mapping(Value::from(toml::Value::Table(table)), default)
}

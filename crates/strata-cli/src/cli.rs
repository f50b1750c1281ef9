use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(about = "strata - inspect layered session configuration")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level written to stderr (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true)]
    pub log_level: Option<LevelFilter>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config layer file, may be repeated; later files override earlier ones
    /// (defaults to ~/.config/strata/config.toml)
    #[arg(short = 'C', long = "config", global = true)]
    pub config: Vec<PathBuf>,

    /// Disable colored output regardless of configuration
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Effective log filter; logging is off unless asked for
    pub fn log_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level,
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::OFF,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the value at each dotted path (e.g. `history.file`)
    Get {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// List every key visible through the layer chain
    Keys,

    /// Print every key with its resolved value
    Dump,

    /// Assign a TOML value in the session layer and print the layer
    Set {
        key: String,
        /// TOML literal; anything unparsable is taken as a plain string
        value: String,
    },
}

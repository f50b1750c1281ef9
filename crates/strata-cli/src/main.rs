use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use strata_cli::{cli::Cli, commands};
use strata_output::OutputSink;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging goes to stderr so it never mixes with command output
    let env_filter = EnvFilter::builder()
        .with_default_directive(cli.log_filter().into())
        .with_env_var("STRATA_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let session = commands::build_session(&cli)?;
    let mut out = OutputSink::stdout(session.clone());
    commands::run(&cli, &session, &mut out)
}

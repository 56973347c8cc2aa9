//! stix2viz CLI main entry point

use anyhow::Result;
use clap::Parser;
use stix2viz_cli::{commands::{Cli, CommandExecutor}, interactive::start_interactive};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // No arguments provided, start interactive mode
    if std::env::args().len() == 1 {
        start_interactive()?;
        return Ok(());
    }

    let cli = Cli::parse();

    let mut executor = CommandExecutor::new();
    let result = executor.execute(cli.command)?;

    if result.success {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}

//! ox - OX Suite CLI
//!
//! Loads paginated backend lists into pooled collections and renders each
//! record through the `ox/cli/record` extension point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;
mod error;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let directive = if cli.verbose { "ox=debug" } else { "ox=info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    // Load configuration
    let config = config::Config::load()?;

    // Execute command
    match cli.command {
        Commands::List(args) => commands::list::execute(args, &config).await,
        Commands::Signature(args) => commands::signature::execute(args, &config),
        Commands::Config { json } => commands::config::execute(json, &config),
        Commands::Version => {
            println!("ox {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

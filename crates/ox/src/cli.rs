//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// OX Suite CLI
///
/// Browse backend list endpoints page by page.
#[derive(Parser, Debug)]
#[command(name = "ox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a module's list and print its records
    List(ListArgs),

    /// Print the collection signature of a parameter set
    Signature(SignatureArgs),

    /// Show the effective configuration
    Config {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show version
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Backend module (e.g. mail, contacts, tasks)
    pub module: String,

    /// Query parameter as key=value (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Column projection sent as `columns`
    #[arg(long)]
    pub columns: Option<String>,

    /// Additional pages to fetch after the first
    #[arg(long, default_value_t = 0)]
    pub pages: usize,

    /// Page size (defaults to the configured page size)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Server-pushed responses to serve before the network (JSON file)
    #[arg(long)]
    pub rampup: Option<PathBuf>,

    /// Output records as JSON lines
    #[arg(short, long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SignatureArgs {
    /// Query parameter as key=value (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Key to leave out of the signature (repeatable, defaults to the config)
    #[arg(long)]
    pub ignore: Vec<String>,
}

/// Parse `key=value`. The value may itself contain `=`.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

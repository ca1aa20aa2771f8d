//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Page through REST collections from the command line
#[derive(Parser, Debug)]
#[command(name = "restmod-paging")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Collection config file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a single page
    Fetch {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Fetch pages until the last one
    Walk {
        #[command(flatten)]
        target: TargetArgs,

        /// Stop after this many pages
        #[arg(long, default_value = "100")]
        max_pages: u32,
    },
}

/// Where to fetch from and with which parameters.
///
/// Flags override values from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Base URL of the API
    #[arg(long)]
    pub url: Option<String>,

    /// Collection path
    #[arg(long)]
    pub path: Option<String>,

    /// Dotted path to the records in the response
    #[arg(long)]
    pub items_path: Option<String>,

    /// Start page
    #[arg(long)]
    pub page: Option<u32>,

    /// Page size
    #[arg(long)]
    pub limit: Option<u32>,

    /// Filter parameter as key=value (repeatable)
    #[arg(short = 'f', long = "filter", value_parser = parse_key_value)]
    pub filters: Vec<(String, String)>,

    /// Mirror the request params into this address bar URL.
    /// Implies `mixins.query_string`.
    #[arg(long)]
    pub address_bar: Option<String>,
}

/// Parse `key=value`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}

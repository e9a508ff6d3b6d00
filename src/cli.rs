//! Command-line interface definitions.
//!
//! One subcommand-free invocation per scheduled run. Everything beyond
//! these flags is configuration, loaded from the optional YAML file.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one pipeline run.
///
/// # Examples
///
/// ```sh
/// # Defaults: built-in sources, ./out, cap 50
/// ace_events -o ./out
///
/// # Custom sources and header from a config file, guide index included
/// ace_events -o ./out --config ace_events.yaml --guide
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for playlists, record dumps, and history
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the configured per-request timeout, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Override the configured history snapshot cap
    #[arg(long)]
    pub history_cap: Option<usize>,

    /// Also refresh the EPG guide channel index
    #[arg(long)]
    pub guide: bool,
}

//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod cache;
pub mod context;
pub mod session;

pub use args::{GlobalOptions, OutputFormat, SessionArgs};
pub use context::CommandContext;

use crate::cache::DatasetKind;

/// Paddock - cached Formula 1 timing data with stint and pit-stop analysis
#[derive(Parser, Debug)]
#[command(name = "paddock")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "PADDOCK_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "PADDOCK_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "PADDOCK_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Cache directory (defaults to the platform cache dir)
    #[arg(long, global = true, env = "PADDOCK_CACHE_DIR", hide_env = true)]
    pub cache_dir: Option<PathBuf>,

    /// Timing API base URL
    #[arg(long, global = true, env = "PADDOCK_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Bypass the cache entirely
    #[arg(long, global = true, env = "PADDOCK_NO_CACHE", hide_env = true)]
    pub no_cache: bool,

    /// Refetch from upstream even when cached, then update the cache
    #[arg(long, global = true, conflicts_with = "no_cache")]
    pub refresh: bool,

    /// Serve expired cache entries if the upstream fetch fails
    #[arg(long, global = true, env = "PADDOCK_SERVE_STALE", hide_env = true)]
    pub serve_stale: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Race summary: winner, podium, fastest lap and weather
    #[command(after_help = "EXAMPLES:\n  \
        paddock summary 2024 bahrain\n  \
        paddock summary 2024 5 --session sprint")]
    Summary(SessionArgs),

    /// Tire stints per driver
    Stints(SessionArgs),

    /// Pit stops (tire changes between stints)
    Pits(SessionArgs),

    /// Race pace over quick laps, with positions gained
    Pace(SessionArgs),

    /// Manage the local session cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Display version information
    Version,
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,
    /// Clear all cached data
    Clear,
    /// Print cache directory path
    Path,
    /// Remove cached data for one session
    Invalidate {
        #[command(flatten)]
        session: SessionArgs,

        /// Only remove this dataset (results, laps, qualifying, weather)
        #[arg(long, hide_possible_values = true)]
        dataset: Option<DatasetKind>,
    },
}

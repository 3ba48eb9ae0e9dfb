//! Paddock CLI - cached Formula 1 timing data with stint and pit-stop analysis

use clap::Parser;

mod adapter;
mod analysis;
mod cache;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;
mod session;

use cli::{CacheCommands, Cli, Commands, GlobalOptions};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Summary(args) => cli::session::summary(&opts, &args).await,
        Commands::Stints(args) => cli::session::stints(&opts, &args).await,
        Commands::Pits(args) => cli::session::pits(&opts, &args).await,
        Commands::Pace(args) => cli::session::pace(&opts, &args).await,
        Commands::Cache(cache_cmd) => match cache_cmd {
            CacheCommands::Status => cli::cache::status(&opts),
            CacheCommands::Clear => cli::cache::clear(&opts),
            CacheCommands::Path => cli::cache::path(&opts),
            CacheCommands::Invalidate { session, dataset } => {
                cli::cache::invalidate(&opts, &session, dataset).await
            }
        },
        Commands::Version => {
            println!("paddock version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Warnings only by default; `--debug` enables this crate's debug output.
/// `RUST_LOG` overrides both.
fn init_logging(debug: bool) {
    let default_filter = if debug { "paddock=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

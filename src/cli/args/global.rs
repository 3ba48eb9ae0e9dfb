//! Global CLI options shared across all commands

use std::path::{Path, PathBuf};

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// For most options, the precedence is: CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; config file defaults are resolved later in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format; `None` defers to the config file
    pub format: Option<OutputFormat>,

    /// Custom config file path (defaults to ~/.paddock/config.yaml)
    pub config: Option<String>,

    /// Cache root override
    pub cache_dir: Option<PathBuf>,

    /// Timing API base URL override
    pub api_host: Option<String>,

    /// Neither read nor write the cache
    pub no_cache: bool,

    /// Skip cache reads but still write fetched data
    pub refresh: bool,

    /// Serve expired cache entries when the upstream fetch fails
    pub serve_stale: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    ///
    /// This is the primary constructor, called once in main.rs after parsing.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            cache_dir: cli.cache_dir.clone(),
            api_host: cli.api_host.clone(),
            no_cache: cli.no_cache,
            refresh: cli.refresh,
            serve_stale: cli.serve_stale,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn cache_dir_ref(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// Get API host override as `Option<&str>`.
    pub fn api_host_ref(&self) -> Option<&str> {
        self.api_host.as_deref()
    }
}

//! Command execution context
//!
//! Provides a unified context for command execution, eliminating boilerplate
//! for config loading, cache setup, and provider initialization.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cache::{CacheStore, LoadedSession, SessionLoader};
use crate::cli::{GlobalOptions, OutputFormat, SessionArgs};
use crate::client::HttpTimingProvider;
use crate::config::Config;
use crate::error::Result;
use crate::session::SessionId;

/// Context for command execution containing config, loader, and runtime options.
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Session loader over the HTTP provider and local cache
    pub loader: SessionLoader<HttpTimingProvider>,
    /// Output format preference
    pub format: OutputFormat,
    cache_root: PathBuf,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// This handles:
    /// - Loading config from path (or default location)
    /// - Resolving the cache root and API host from flags, env and config
    /// - Creating the provider and wrapping it in the cache-first loader
    ///
    /// # Errors
    /// Returns error if the config file is malformed or no cache root can be determined.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = match opts.config_ref() {
            Some(path) => Config::load_from(Path::new(path))?,
            None => Config::load()?,
        };

        let format = opts
            .format
            .or_else(|| {
                config
                    .preferences
                    .format
                    .as_deref()
                    .and_then(OutputFormat::from_name)
            })
            .unwrap_or_default();

        let cache_root = config.cache_root(opts.cache_dir_ref())?;
        let store = if opts.no_cache {
            None
        } else {
            Some(CacheStore::open_at(&cache_root))
        };

        let provider = HttpTimingProvider::new(config.api_host(opts.api_host_ref()))?;
        let loader = SessionLoader::new(provider, store)
            .with_stale_policy(config.stale_policy(opts.serve_stale))
            .with_refresh(opts.refresh);

        log::debug!("Cache root: {}", cache_root.display());

        Ok(Self {
            config,
            loader,
            format,
            cache_root,
        })
    }

    /// Cache root, resolved even when `--no-cache` disables the loader's store.
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Cache store for the `cache` subcommands.
    pub fn cache_store(&self) -> CacheStore {
        CacheStore::open_at(&self.cache_root)
    }

    /// Load a session with a spinner on interactive terminals.
    pub async fn load(&self, args: &SessionArgs) -> Result<LoadedSession> {
        let spinner = self.spinner(format!(
            "Loading {} {} {}...",
            args.year, args.event, args.session
        ));
        let result = self.loader.load(args.year, &args.event, args.session).await;
        spinner.finish_and_clear();

        let loaded = result?;
        log::debug!(
            "Loaded {} ({} laps, {} stints)",
            loaded.id.canonical(),
            loaded.data.laps.len(),
            loaded.stints.len()
        );
        Ok(loaded)
    }

    /// Resolve a session without loading its data.
    pub async fn resolve(&self, args: &SessionArgs) -> Result<SessionId> {
        self.loader.resolve(args.year, &args.event, args.session).await
    }

    fn spinner(&self, message: String) -> ProgressBar {
        if self.format == OutputFormat::Json || !std::io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StalePolicy;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> String {
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, contents).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_context_uses_config_file() {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("cache-from-config");
        let config = write_config(
            &dir,
            &format!(
                "cache_dir: {}\nstale_fallback: serve_stale\npreferences:\n  format: json\n",
                cache.display()
            ),
        );

        let ctx = CommandContext::new(&GlobalOptions {
            config: Some(config),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(ctx.format, OutputFormat::Json);
        assert_eq!(ctx.cache_root(), cache.as_path());
        assert_eq!(ctx.config.stale_fallback, StalePolicy::ServeStale);
        assert!(ctx.loader.store().is_some());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, "cache_dir: /from/config\npreferences:\n  format: json\n");
        let flag_dir = dir.path().join("from-flag");

        let ctx = CommandContext::new(&GlobalOptions {
            config: Some(config),
            format: Some(OutputFormat::Pretty),
            cache_dir: Some(flag_dir.clone()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(ctx.format, OutputFormat::Pretty);
        assert_eq!(ctx.cache_root(), flag_dir.as_path());
    }

    #[test]
    fn test_no_cache_disables_store() {
        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, "");

        let ctx = CommandContext::new(&GlobalOptions {
            config: Some(config),
            cache_dir: Some(dir.path().join("cache")),
            no_cache: true,
            ..Default::default()
        })
        .unwrap();

        assert!(ctx.loader.store().is_none());
        assert_eq!(ctx.format, OutputFormat::Table);
    }
}

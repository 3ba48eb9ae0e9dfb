//! Configuration management for Paddock

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cache::{CacheStore, StalePolicy};
use crate::error::{ConfigError, Result};

/// Application configuration
///
/// Every field is optional; command-line flags and `PADDOCK_*` environment
/// variables take precedence over values read from the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Cache root directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Base URL of the timing API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// Whether to serve expired cache entries when the upstream fetch fails
    #[serde(default)]
    pub stale_fallback: StalePolicy,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// User preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".paddock").join("config.yaml"))
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load configuration from a specific path. A missing file is an empty config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(host) = &self.api_host
            && !(host.starts_with("http://") || host.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "api_host must be an http(s) URL, got '{}'",
                host
            ))
            .into());
        }
        Ok(())
    }

    /// Cache root: explicit override, then config file, then the platform cache dir.
    pub fn cache_root(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        match cli_override.or(self.cache_dir.as_deref()) {
            Some(dir) => Ok(dir.to_path_buf()),
            None => Ok(CacheStore::default_dir()?),
        }
    }

    /// API host: explicit override, then config file.
    pub fn api_host(&self, cli_override: Option<&str>) -> Option<String> {
        cli_override
            .map(str::to_string)
            .or_else(|| self.api_host.clone())
    }

    /// Stale policy, where `--serve-stale` can only loosen the configured one.
    pub fn stale_policy(&self, serve_stale: bool) -> StalePolicy {
        if serve_stale {
            StalePolicy::ServeStale
        } else {
            self.stale_fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.cache_dir.is_none());
        assert!(config.api_host.is_none());
        assert_eq!(config.stale_fallback, StalePolicy::Refuse);
        assert!(config.preferences.format.is_none());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_full_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "cache_dir: /tmp/paddock-cache\n\
             api_host: https://timing.example.com\n\
             stale_fallback: serve_stale\n\
             preferences:\n  format: json\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/paddock-cache")));
        assert_eq!(config.api_host.as_deref(), Some("https://timing.example.com"));
        assert_eq!(config.stale_fallback, StalePolicy::ServeStale);
        assert_eq!(config.preferences.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "stale_fallback: sometimes\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_non_url_host_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api_host: timing.example.com\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = Config {
            cache_dir: Some(PathBuf::from("/from/config")),
            api_host: Some("https://config.example.com".to_string()),
            ..Default::default()
        };

        assert_eq!(
            config.cache_root(Some(Path::new("/from/flag"))).unwrap(),
            PathBuf::from("/from/flag")
        );
        assert_eq!(config.cache_root(None).unwrap(), PathBuf::from("/from/config"));
        assert_eq!(
            config.api_host(Some("https://flag.example.com")).as_deref(),
            Some("https://flag.example.com")
        );
        assert_eq!(
            config.api_host(None).as_deref(),
            Some("https://config.example.com")
        );
    }

    #[test]
    fn test_serve_stale_flag_loosens_policy() {
        let config = Config::default();
        assert_eq!(config.stale_policy(false), StalePolicy::Refuse);
        assert_eq!(config.stale_policy(true), StalePolicy::ServeStale);

        let config = Config {
            stale_fallback: StalePolicy::ServeStale,
            ..Default::default()
        };
        assert_eq!(config.stale_policy(false), StalePolicy::ServeStale);
    }
}

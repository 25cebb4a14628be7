//! Configuration for the wiki server.
//!
//! Read from `--config <path>` when given, otherwise from
//! `~/.config/risks-wiki/config.toml` if that file exists. Missing fields
//! fall back to defaults; no file at all means an all-default config.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::fetcher::http_fetcher::DEFAULT_USER_AGENT;

pub const DEFAULT_FEED_URL: &str = "http://catless.ncl.ac.uk/risksrss2.xml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// RSS/Atom feed the wiki is built from
    pub feed_url: String,
    /// Listen address for `serve`
    pub bind: String,
    /// Staleness threshold, e.g. "12h", "30m", "1d"
    pub refresh_interval: String,
    /// Upper bound on a single feed fetch
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            bind: "127.0.0.1:8000".to_string(),
            refresh_interval: "12h".to_string(),
            fetch_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `path` is None.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// `~/.config/risks-wiki/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("risks-wiki").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.feed_url)
            .map_err(|e| ConfigError::Invalid(format!("feed_url {}: {}", self.feed_url, e)))?;
        parse_interval(&self.refresh_interval).map_err(ConfigError::Invalid)?;
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> chrono::Duration {
        // parse_interval caps the value, so the conversion below cannot overflow
        let secs = parse_interval(&self.refresh_interval).unwrap_or(12 * 3600);
        chrono::Duration::seconds(secs as i64)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Longest accepted refresh interval (365 days).
pub const MAX_INTERVAL_SECS: u64 = 365 * 86400;

/// Parse interval string like "1h", "30m", "12h", "1d"
pub fn parse_interval(s: &str) -> Result<u64, String> {
    let s = s.trim().to_lowercase();

    let (digits, unit, name) = if let Some(hours) = s.strip_suffix('h') {
        (hours, 3600, "hours")
    } else if let Some(minutes) = s.strip_suffix('m') {
        (minutes, 60, "minutes")
    } else if let Some(days) = s.strip_suffix('d') {
        (days, 86400, "days")
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, 1, "seconds")
    } else {
        // Raw seconds
        (s.as_str(), 1, "interval")
    };

    let secs = digits
        .parse::<u64>()
        .map_err(|_| format!("Invalid {}: {}. Use format like '12h', '30m', '1d'", name, digits))?
        .checked_mul(unit)
        .filter(|secs| *secs <= MAX_INTERVAL_SECS)
        .ok_or_else(|| format!("Refresh interval {} exceeds 365d", s))?;

    if secs == 0 {
        return Err("Refresh interval must be positive".to_string());
    }
    Ok(secs)
}

/// Format interval for display
pub fn format_interval(secs: u64) -> String {
    if secs >= 86400 && secs.is_multiple_of(86400) {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs.is_multiple_of(60) {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

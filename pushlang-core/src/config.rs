//! Configuration loading and management
//!
//! Configuration is layered:
//! 1. Built-in defaults
//! 2. Optional `~/.config/pushlang/config.toml`
//! 3. Environment variables (`GH_TOKEN`, `GIST_ID`, `USERNAME`, `DAYS`)
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/pushlang/` (~/.config/pushlang/)
//! - State/Logs: `$XDG_STATE_HOME/pushlang/` (~/.local/state/pushlang/)

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable carrying the GitHub token.
pub const ENV_TOKEN: &str = "GH_TOKEN";
/// Environment variable carrying the gist to overwrite.
pub const ENV_GIST_ID: &str = "GIST_ID";
/// Environment variable carrying the activity-feed owner.
pub const ENV_USERNAME: &str = "USERNAME";
/// Environment variable carrying the lookback window in days.
pub const ENV_DAYS: &str = "DAYS";

/// Lookback window bounds, in days.
pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 30;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// GitHub access and activity window
    #[serde(default)]
    pub github: GitHubConfig,

    /// Synthetic corpus and classifier settings
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Report rendering and publishing
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubConfig {
    /// Personal access token (usually supplied through `GH_TOKEN`)
    pub token: Option<String>,

    /// Gist to overwrite (usually supplied through `GIST_ID`)
    pub gist_id: Option<String>,

    /// Activity-feed owner (usually supplied through `USERNAME`)
    pub username: Option<String>,

    /// Lookback window in days, clamped to 1..=30
    #[serde(default = "default_days")]
    pub days: u32,

    /// REST/GraphQL API root
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            gist_id: None,
            username: None,
            days: default_days(),
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_days() -> u32 {
    14
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Synthetic corpus configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    /// Classifier executable, invoked as `<classifier> --breakdown --json`
    #[serde(default = "default_classifier")]
    pub classifier: String,

    /// Existing git checkout to reset and reuse instead of a temp directory.
    ///
    /// Everything tracked or untracked in it is deleted.
    pub workdir: Option<PathBuf>,

    /// Attempts for the marker write and identity setup
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between attempts, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Committer name for the throwaway commit
    #[serde(default = "default_identity_name")]
    pub identity_name: String,

    /// Committer email for the throwaway commit
    #[serde(default = "default_identity_email")]
    pub identity_email: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            classifier: default_classifier(),
            workdir: None,
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            identity_name: default_identity_name(),
            identity_email: default_identity_email(),
        }
    }
}

impl CorpusConfig {
    /// Retry policy for the flaky setup steps.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
    }
}

fn default_classifier() -> String {
    "github-linguist".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_identity_name() -> String {
    "pushlang".to_string()
}

fn default_identity_email() -> String {
    "pushlang@users.noreply.github.com".to_string()
}

/// Report configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Display name given to the gist file on every update
    #[serde(default = "default_gist_title")]
    pub gist_title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            gist_title: default_gist_title(),
        }
    }
}

fn default_gist_title() -> String {
    "Recent Coding Languages".to_string()
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Required values for a collection run, resolved from [`Config`].
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub gist_id: String,
    pub username: String,
}

impl Config {
    /// Load configuration from the default path, then overlay the environment.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Config::default()
        };

        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a specific path (environment not applied)
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.github.days = clamp_days(i64::from(config.github.days));

        Ok(config)
    }

    /// Overlay `GH_TOKEN`, `GIST_ID`, `USERNAME` and `DAYS` from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay environment values from an arbitrary lookup.
    ///
    /// Empty values count as unset.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_TOKEN) {
            self.github.token = Some(token);
        }
        if let Some(gist_id) = get(ENV_GIST_ID) {
            self.github.gist_id = Some(gist_id);
        }
        if let Some(username) = get(ENV_USERNAME) {
            self.github.username = Some(username);
        }
        if let Some(days) = get(ENV_DAYS) {
            self.github.days = parse_days(&days)?;
        }
        Ok(())
    }

    /// Resolve the values a collection run cannot do without.
    pub fn credentials(&self) -> Result<Credentials> {
        let token = required(&self.github.token, ENV_TOKEN)?;
        let gist_id = required(&self.github.gist_id, ENV_GIST_ID)?;
        let username = required(&self.github.username, ENV_USERNAME)?;
        Ok(Credentials {
            token,
            gist_id,
            username,
        })
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/pushlang/config.toml` (~/.config/pushlang/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("pushlang").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/pushlang/` (~/.local/state/pushlang/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("pushlang")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/pushlang/pushlang.log` (~/.local/state/pushlang/pushlang.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("pushlang.log")
    }
}

fn required(value: &Option<String>, env_name: &str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Config(format!("{} is not provided.", env_name)))
}

/// Parse a `DAYS` value and clamp it into the supported window.
pub fn parse_days(raw: &str) -> Result<u32> {
    let days: i64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a whole number, got {:?}", ENV_DAYS, raw)))?;
    Ok(clamp_days(days))
}

fn clamp_days(days: i64) -> u32 {
    days.clamp(i64::from(MIN_DAYS), i64::from(MAX_DAYS)) as u32
}

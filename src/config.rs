//! Configuration module for newswire.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::news::types::DEFAULT_WINDOW;
use crate::{NewswireError, Result};

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the Web API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins (empty = any origin).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8000
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/newswire.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/newswire.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// A configured channel: local category name plus the remote channel handle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Category name the channel's posts are stored under.
    pub category: String,
    /// Public channel handle used to build the preview page address.
    pub handle: String,
}

impl SourceConfig {
    /// Create a new source entry.
    pub fn new(category: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            handle: handle.into(),
        }
    }
}

/// Ingestion configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Base address of the public preview host.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User agent sent with every page request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Total request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Number of most recent posts taken per source per pass.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Largest window a caller may request.
    #[serde(default = "default_max_window")]
    pub max_window: usize,
    /// Number of sources fetched concurrently.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Maximum page size in bytes.
    #[serde(default = "default_max_page_size")]
    pub max_page_size_bytes: u64,
    /// Drop posts whose permalink could not be extracted.
    #[serde(default = "default_skip_missing_permalink")]
    pub skip_missing_permalink: bool,
    /// Ordered category -> handle mapping.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

fn default_base_url() -> String {
    "https://t.me".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_max_window() -> usize {
    200
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_max_page_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_skip_missing_permalink() -> bool {
    true
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new("first", "mypervye69"),
        SourceConfig::new("history", "myhistorytver"),
        SourceConfig::new("tver", "tver_today"),
        SourceConfig::new("sport", "tverorient"),
    ]
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            window: default_window(),
            max_window: default_max_window(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            max_page_size_bytes: default_max_page_size(),
            skip_missing_permalink: default_skip_missing_permalink(),
            sources: default_sources(),
        }
    }
}

impl IngestConfig {
    /// Check whether a category is configured.
    pub fn has_category(&self, category: &str) -> bool {
        self.sources.iter().any(|s| s.category == category)
    }

    /// Validate a requested window size against this configuration.
    pub fn check_window(&self, window: usize) -> Result<usize> {
        if window == 0 || window > self.max_window {
            return Err(NewswireError::Validation(format!(
                "window must be between 1 and {}, got {}",
                self.max_window, window
            )));
        }
        Ok(window)
    }
}

/// Check that a channel handle is usable in a page address.
pub fn is_valid_handle(handle: &str) -> bool {
    !handle.is_empty()
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Ingestion configuration.
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(NewswireError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| NewswireError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `NEWSWIRE_DATABASE_PATH`: Override the database file path
    /// - `NEWSWIRE_LOG_LEVEL`: Override the log level
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("NEWSWIRE_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
        if let Ok(level) = std::env::var("NEWSWIRE_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let ingest = &self.ingest;

        url::Url::parse(&ingest.base_url)
            .map_err(|e| NewswireError::Config(format!("invalid ingest.base_url: {e}")))?;

        if ingest.max_concurrent_fetches == 0 {
            return Err(NewswireError::Config(
                "ingest.max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if ingest.window == 0 || ingest.window > ingest.max_window {
            return Err(NewswireError::Config(format!(
                "ingest.window must be between 1 and {}",
                ingest.max_window
            )));
        }

        let mut seen = HashSet::new();
        for source in &ingest.sources {
            if source.category.trim().is_empty() {
                return Err(NewswireError::Config(
                    "ingest source has an empty category".to_string(),
                ));
            }
            if !seen.insert(source.category.as_str()) {
                return Err(NewswireError::Config(format!(
                    "duplicate ingest category: {}",
                    source.category
                )));
            }
            if !is_valid_handle(&source.handle) {
                return Err(NewswireError::Config(format!(
                    "invalid handle for category {}: {:?}",
                    source.category, source.handle
                )));
            }
        }
        Ok(())
    }
}

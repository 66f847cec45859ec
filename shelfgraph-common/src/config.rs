//! Configuration loading and credential resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`SHELFGRAPH_*`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing TOML file is not an error; defaults are used and a warning logged.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory name used under the platform config/data directories
pub const APP_DIR_NAME: &str = "shelfgraph";

/// Environment variable holding the catalog API key
pub const ENV_CLIENT_KEY: &str = "SHELFGRAPH_CLIENT_KEY";

/// Configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Catalog API key
    #[serde(default)]
    pub client_key: Option<String>,

    /// Override for the catalog API base URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// SQLite response cache location (default: `<data_dir>/shelfgraph/cache.sqlite`)
    #[serde(default)]
    pub cache_path: Option<PathBuf>,

    /// Age after which cached responses are refetched (hours, unset = never)
    #[serde(default)]
    pub cache_ttl_hours: Option<u64>,

    /// Outbound request rate
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Number of pages fetched concurrently after the first
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    /// Where rendered charts are written
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_requests_per_second() -> u32 {
    1 // Catalog API terms: at most one request per second
}

fn default_fetch_concurrency() -> usize {
    1
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from `path`, or from the default location when `None`
    ///
    /// A missing file yields defaults. An unreadable or unparseable file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => {
                    warn!("Could not determine config directory, using defaults");
                    return Ok(Self::defaults());
                }
            },
        };

        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::defaults());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Built-in defaults, identical to parsing an empty file
    pub fn defaults() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            fetch_concurrency: default_fetch_concurrency(),
            ..Default::default()
        }
    }

    /// Resolved cache location: TOML override, else platform data dir
    pub fn resolved_cache_path(&self) -> PathBuf {
        self.cache_path.clone().unwrap_or_else(default_cache_path)
    }

    /// Resolved chart output directory: TOML override, else `./charts`
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("charts"))
    }
}

/// Default configuration file path for the platform
///
/// `~/.config/shelfgraph/config.toml` on Linux, the platform equivalent elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// Default response cache path for the platform
pub fn default_cache_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME).join("cache.sqlite"))
        .unwrap_or_else(|| PathBuf::from("./shelfgraph_cache.sqlite"))
}

/// Resolve a credential from CLI → ENV → TOML
///
/// Warns when more than one source supplies a usable value. Returns `None`
/// when no source does.
pub fn resolve_credential(
    name: &str,
    cli_value: Option<&str>,
    env_var_name: &str,
    toml_value: Option<&str>,
) -> Option<String> {
    let env_value = std::env::var(env_var_name).ok();

    let candidates = [
        ("command line", cli_value),
        ("environment", env_value.as_deref()),
        ("TOML", toml_value),
    ];

    let sources: Vec<&str> = candidates
        .iter()
        .filter(|(_, v)| v.map(is_valid_credential).unwrap_or(false))
        .map(|(source, _)| *source)
        .collect();

    if sources.len() > 1 {
        warn!(
            "{} found in multiple sources: {}. Using {} (highest priority).",
            name,
            sources.join(", "),
            sources[0]
        );
    }

    candidates
        .iter()
        .find_map(|(source, v)| match v {
            Some(value) if is_valid_credential(value) => {
                info!("{} loaded from {}", name, source);
                Some(value.trim().to_string())
            }
            _ => None,
        })
}

/// Validate credential (non-empty, non-whitespace)
pub fn is_valid_credential(value: &str) -> bool {
    !value.trim().is_empty()
}

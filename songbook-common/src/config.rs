//! Configuration loading and config file resolution
//!
//! Bootstrap configuration comes from a single TOML file. Every field has a
//! built-in default, so a missing file is not an error.
//!
//! # Config file priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`SONGBOOK_CONFIG`)
//! 3. `<config_dir>/songbook/config.toml`
//! 4. Built-in defaults (no file)

use crate::notation::LayoutMode;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SONGBOOK_CONFIG";

/// Spreadsheet the songbook is published from
pub const DEFAULT_SPREADSHEET_ID: &str = "1-Cui0FrWkLV9qQXZkZKcGEJ26RlS8YJukkdv9lSF4_4";

/// Browser-like identification; the tab sites reject obvious bots
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongbookConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Google Sheets document holding the song list
    #[serde(default = "default_spreadsheet_id")]
    pub spreadsheet_id: String,

    /// Layout used for chord-annotated lines
    #[serde(default)]
    pub layout: LayoutMode,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Outgoing fetch behaviour
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Generative capability settings
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Outgoing fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Upper bound for one step of the chord source chain
    #[serde(default = "default_step_timeout_secs")]
    pub step_timeout_secs: u64,

    /// Timeout for a single HTTP request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User-Agent sent with every outgoing request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Generative capability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key (environment variables take priority)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

fn default_port() -> u16 {
    5780
}

fn default_spreadsheet_id() -> String {
    DEFAULT_SPREADSHEET_ID.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_step_timeout_secs() -> u64 {
    20
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for SongbookConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            spreadsheet_id: default_spreadsheet_id(),
            layout: LayoutMode::default(),
            logging: LoggingConfig::default(),
            fetch: FetchConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            step_timeout_secs: default_step_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

impl FetchConfig {
    /// Per-step timeout as Duration
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    /// Per-request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl SongbookConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve and load configuration
    ///
    /// An explicitly named file (CLI or environment) must exist; the default
    /// location is optional and silently falls back to built-in defaults.
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg, CONFIG_ENV_VAR) {
            ConfigSource::Explicit(path) => Self::load_from(&path),
            ConfigSource::Default(path) if path.exists() => Self::load_from(&path),
            ConfigSource::Default(path) => {
                debug!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            ConfigSource::BuiltIn => {
                debug!("Could not determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Where the configuration file comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named by CLI argument or environment variable
    Explicit(PathBuf),
    /// Platform config directory
    Default(PathBuf),
    /// No file location could be determined
    BuiltIn,
}

/// Resolve the config file location following the documented priority order
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return ConfigSource::Explicit(PathBuf::from(path));
        }
    }

    // Priority 3: platform config directory
    match dirs::config_dir() {
        Some(dir) => ConfigSource::Default(dir.join("songbook").join("config.toml")),
        None => ConfigSource::BuiltIn,
    }
}

//! Configuration loading and validation for chatrelay.
//!
//! Loads configuration from `~/.chatrelay/config.toml` with environment
//! variable overrides. The one required secret — the LLM API key — comes
//! only from the `GEMINI_API_KEY` environment variable and fails fast at
//! load time when absent, instead of surfacing as an opaque server error
//! on the first request.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Environment variable holding the LLM API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingApiKey(&'static str),

    #[error("Failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl From<ConfigError> for chatrelay_core::Error {
    fn from(err: ConfigError) -> Self {
        chatrelay_core::Error::Config {
            message: err.to_string(),
        }
    }
}

/// The root configuration structure.
///
/// Maps directly to `~/.chatrelay/config.toml`, except for `api_key`,
/// which is environment-only and never serialized back out.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// History store configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// LLM endpoint configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// LLM API key, from `GEMINI_API_KEY` only
    #[serde(skip)]
    pub api_key: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("gateway", &self.gateway)
            .field("history", &self.history)
            .field("llm", &self.llm)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Which backend to use: "sqlite" or "memory"
    #[serde(default = "default_history_backend")]
    pub backend: String,

    /// Database file path for the sqlite backend
    #[serde(default = "default_history_path")]
    pub path: String,
}

fn default_history_backend() -> String {
    "sqlite".into()
}
fn default_history_path() -> String {
    AppConfig::workspace_dir()
        .join("history.db")
        .to_string_lossy()
        .into_owned()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: default_history_backend(),
            path: default_history_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name sent in the generateContent path
    #[serde(default = "default_model")]
    pub model: String,

    /// Endpoint base URL (overridable for tests and proxies)
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            history: HistoryConfig::default(),
            llm: LlmConfig::default(),
            api_key: String::new(),
        }
    }
}

impl AppConfig {
    /// The chatrelay workspace directory (`~/.chatrelay`).
    pub fn workspace_dir() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".chatrelay")
    }

    /// The config file path (`~/.chatrelay/config.toml`).
    pub fn config_path() -> PathBuf {
        Self::workspace_dir().join("config.toml")
    }

    /// Load from the config file (if present), apply environment overrides,
    /// and require the API key.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        let file_contents = if path.exists() {
            Some(
                std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                    path: path.to_string_lossy().into_owned(),
                    reason: e.to_string(),
                })?,
            )
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            None
        };

        let mut config = Self::from_sources(file_contents.as_deref(), std::env::var(API_KEY_ENV).ok())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Build a config from raw sources. Split out from [`Self::load`] so
    /// tests can run without touching the process environment.
    pub fn from_sources(
        file_contents: Option<&str>,
        api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config: AppConfig = match file_contents {
            Some(toml_str) => toml::from_str(toml_str)?,
            None => AppConfig::default(),
        };

        config.api_key = match api_key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(ConfigError::MissingApiKey(API_KEY_ENV)),
        };

        Ok(config)
    }

    /// Apply `CHATRELAY_*` environment overrides on top of file values.
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("CHATRELAY_HOST") {
            self.gateway.host = host;
        }
        if let Ok(port) = std::env::var("CHATRELAY_PORT") {
            if let Ok(port) = port.parse() {
                self.gateway.port = port;
            }
        }
        if let Ok(path) = std::env::var("CHATRELAY_HISTORY_PATH") {
            self.history.path = path;
        }
        if let Ok(model) = std::env::var("CHATRELAY_MODEL") {
            self.llm.model = model;
        }
        if let Ok(url) = std::env::var("CHATRELAY_BASE_URL") {
            self.llm.base_url = url;
        }
    }
}

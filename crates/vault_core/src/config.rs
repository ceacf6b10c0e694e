//! Runtime configuration for a vault session.
//!
//! # Responsibility
//! - Describe where data and logs live, the write policy and AI settings.
//! - Load configuration from environment variables or a JSON document.
//!
//! # Invariants
//! - Every field has a default; an empty source yields `VaultConfig::default()`.
//! - Returned configs have passed `validate()`.

use crate::logging::{default_log_level, normalize_level};
use crate::persist::storage::WritePolicy;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DB_PATH: &str = "VAULT_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "VAULT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "VAULT_LOG_DIR";
pub const ENV_WRITE_POLICY: &str = "VAULT_WRITE_POLICY";
pub const ENV_AI_ENDPOINT: &str = "VAULT_AI_ENDPOINT";
pub const ENV_AI_MODEL: &str = "VAULT_AI_MODEL";
pub const ENV_AI_TIMEOUT_MS: &str = "VAULT_AI_TIMEOUT_MS";
pub const ENV_AI_API_KEY: &str = "VAULT_AI_API_KEY";
/// Fallback key variable shared with other tooling.
pub const ENV_API_KEY_FALLBACK: &str = "API_KEY";

const DEFAULT_AI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_AI_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_AI_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { key: &'static str, message: String },
    Read { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidValue { .. } => None,
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

/// AI tagging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_AI_ENDPOINT.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            api_key: None,
            timeout_ms: DEFAULT_AI_TIMEOUT_MS,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// SQLite file. `None` keeps everything in memory.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute log directory. `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
    pub write_policy: WritePolicy,
    pub ai: AiConfig,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            write_policy: WritePolicy::default(),
            ai: AiConfig::default(),
        }
    }
}

impl VaultConfig {
    /// Reads `VAULT_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(policy) = get(ENV_WRITE_POLICY) {
            config.write_policy = policy.parse().map_err(|message| ConfigError::InvalidValue {
                key: ENV_WRITE_POLICY,
                message,
            })?;
        }
        if let Some(endpoint) = get(ENV_AI_ENDPOINT) {
            config.ai.endpoint = endpoint;
        }
        if let Some(model) = get(ENV_AI_MODEL) {
            config.ai.model = model;
        }
        if let Some(timeout) = get(ENV_AI_TIMEOUT_MS) {
            config.ai.timeout_ms = timeout.trim().parse().map_err(|err| {
                ConfigError::InvalidValue {
                    key: ENV_AI_TIMEOUT_MS,
                    message: format!("expected milliseconds: {err}"),
                }
            })?;
        }
        config.ai.api_key = get(ENV_AI_API_KEY).or_else(|| get(ENV_API_KEY_FALLBACK));

        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON config document. Missing fields take defaults.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&document)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.log_level).map_err(|level| ConfigError::InvalidValue {
            key: "log_level",
            message: format!("unsupported level `{level}`"),
        })?;
        if self.ai.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ai.timeout_ms",
                message: "timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

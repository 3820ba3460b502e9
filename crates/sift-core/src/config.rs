//! Configuration
//!
//! Loaded from `$SIFT_CONFIG` or `<config dir>/sift/config.toml`. A missing
//! file means defaults; environment variables override file values.
//!
//! ```toml
//! [import]
//! max_import_bytes = 26214400
//!
//! [assist]
//! backend = "command"      # command | ollama | mock
//! timeout_secs = 20
//! command = "codex"
//! args = ["exec"]
//! ollama_host = "http://localhost:11434"
//! ollama_model = "llama3.2"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assist::command::DEFAULT_COMMAND;
use crate::assist::ollama::DEFAULT_MODEL;
use crate::error::{Error, Result};

pub const CONFIG_PATH_ENV: &str = "SIFT_CONFIG";

/// Default cap on an uploaded statement file (25 MB)
pub const DEFAULT_MAX_IMPORT_BYTES: u64 = 25 * 1024 * 1024;

const DEFAULT_ASSIST_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub import: ImportConfig,
    pub assist: AssistConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub max_import_bytes: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_import_bytes: DEFAULT_MAX_IMPORT_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    /// Unset means assistance is disabled
    pub backend: Option<String>,
    pub timeout_secs: u64,
    pub command: String,
    pub args: Vec<String>,
    pub ollama_host: Option<String>,
    pub ollama_model: String,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            backend: None,
            timeout_secs: DEFAULT_ASSIST_TIMEOUT_SECS,
            command: DEFAULT_COMMAND.to_string(),
            args: vec!["exec".to_string()],
            ollama_host: None,
            ollama_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl AssistConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// `<config dir>/sift/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sift").join("config.toml"))
}

impl Config {
    /// Load from `$SIFT_CONFIG` or the default path, then apply env overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_from(path.as_deref())
    }

    /// Load from an explicit path (or the default path), then apply env overrides
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(default_config_path);

        let mut config = match path {
            Some(p) if p.exists() => {
                debug!(path = %p.display(), "Loading config");
                let content = fs::read_to_string(&p).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", p.display(), e))
                })?;
                Self::from_toml(&content)?
            }
            _ => Self::default(),
        };

        config.apply_env_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))
    }

    /// Apply overrides from a variable lookup (the process env in `load`)
    pub fn apply_env_from<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = get("SIFT_ASSIST_BACKEND") {
            self.assist.backend = Some(backend);
        }
        if let Some(secs) = get("SIFT_ASSIST_TIMEOUT_SECS") {
            match secs.trim().parse() {
                Ok(secs) => self.assist.timeout_secs = secs,
                Err(_) => tracing::warn!(value = %secs, "Ignoring invalid SIFT_ASSIST_TIMEOUT_SECS"),
            }
        }
        if let Some(command) = get("SIFT_ASSIST_COMMAND") {
            self.assist.command = command;
        }
        if let Some(host) = get("OLLAMA_HOST") {
            self.assist.ollama_host = Some(host);
        }
        if let Some(model) = get("OLLAMA_MODEL") {
            self.assist.ollama_model = model;
        }
    }
}

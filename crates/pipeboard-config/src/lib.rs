//! Configuration for the pipeline dashboard.
//!
//! The stream URL is an explicit setting: when left blank it is derived from
//! `base_api_url` by swapping the scheme to ws/wss and appending `/ws`,
//! instead of being sensed from any ambient environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_PIPEBOARD_CONFIG: &str = "PIPEBOARD_CONFIG";

const DEFAULT_BASE_API_URL: &str = "http://localhost:8080";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PUSH_BUFFER_CAPACITY: usize = 256;
const DEFAULT_STREAM_RETRY_DELAY_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Message(String),
}

impl ConfigError {
    fn configuration(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipeboardConfig {
    #[serde(default)]
    pub gitlab: GitlabConfigToml,
    #[serde(default)]
    pub runtime: RuntimeConfigToml,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitlabConfigToml {
    #[serde(default = "default_base_api_url")]
    pub base_api_url: String,
    /// Blank means "derive from base_api_url".
    #[serde(default)]
    pub stream_url: String,
}

impl Default for GitlabConfigToml {
    fn default() -> Self {
        Self {
            base_api_url: default_base_api_url(),
            stream_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeConfigToml {
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_push_buffer_capacity")]
    pub push_buffer_capacity: usize,
    #[serde(default = "default_stream_retry_delay_secs")]
    pub stream_retry_delay_secs: u64,
}

impl Default for RuntimeConfigToml {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            push_buffer_capacity: default_push_buffer_capacity(),
            stream_retry_delay_secs: default_stream_retry_delay_secs(),
        }
    }
}

impl PipeboardConfig {
    /// The websocket endpoint to subscribe to, derived from the API base
    /// when not configured explicitly.
    pub fn stream_url(&self) -> String {
        let configured = self.gitlab.stream_url.trim();
        if configured.is_empty() {
            derive_stream_url(&self.gitlab.base_api_url)
        } else {
            configured.to_owned()
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.runtime.fetch_timeout_secs)
    }

    pub fn stream_retry_delay(&self) -> Duration {
        Duration::from_secs(self.runtime.stream_retry_delay_secs)
    }
}

pub fn derive_stream_url(base_api_url: &str) -> String {
    let base = base_api_url.trim().trim_end_matches('/');
    let derived = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        format!("ws://{base}")
    };
    format!("{derived}/ws")
}

pub fn load_from_env() -> Result<PipeboardConfig, ConfigError> {
    let path = config_path_from_env()?;
    load_from_path(path)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<PipeboardConfig, ConfigError> {
    load_or_create_config(path.as_ref())
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = resolve_home_dir().ok_or_else(|| {
        ConfigError::configuration("Unable to resolve home directory from HOME or USERPROFILE")
    })?;

    Ok(home.join(".config").join("pipeboard").join("config.toml"))
}

fn config_path_from_env() -> Result<PathBuf, ConfigError> {
    match std::env::var(ENV_PIPEBOARD_CONFIG) {
        Ok(raw) => {
            if raw.trim().is_empty() {
                default_config_path()
            } else {
                Ok(raw.into())
            }
        }
        Err(std::env::VarError::NotPresent) => default_config_path(),
        Err(_) => Err(ConfigError::configuration(
            "PIPEBOARD_CONFIG contained invalid UTF-8",
        )),
    }
}

fn resolve_home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("USERPROFILE")
                .ok()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
}

fn default_base_api_url() -> String {
    DEFAULT_BASE_API_URL.to_owned()
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_push_buffer_capacity() -> usize {
    DEFAULT_PUSH_BUFFER_CAPACITY
}

fn default_stream_retry_delay_secs() -> u64 {
    DEFAULT_STREAM_RETRY_DELAY_SECS
}

fn persist_config(path: &Path, config: &PipeboardConfig) -> Result<(), ConfigError> {
    let rendered = toml::to_string_pretty(config).map_err(|err| {
        ConfigError::configuration(format!(
            "Failed to serialize PIPEBOARD_CONFIG for {}: {err}",
            path.display()
        ))
    })?;

    std::fs::write(path, rendered.as_bytes()).map_err(|err| {
        ConfigError::configuration(format!(
            "Failed to write PIPEBOARD_CONFIG to {}: {err}",
            path.display()
        ))
    })
}

fn load_or_create_config(path: &Path) -> Result<PipeboardConfig, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|err| {
                        ConfigError::configuration(format!(
                            "Failed to create parent directory {} for PIPEBOARD_CONFIG: {err}",
                            parent.display()
                        ))
                    })?;
                }
            }

            let default_config = PipeboardConfig::default();
            persist_config(path, &default_config)?;
            return Ok(default_config);
        }
        Err(err) => {
            return Err(ConfigError::configuration(format!(
                "Failed to read PIPEBOARD_CONFIG from {}: {err}",
                path.display()
            )));
        }
    };

    let mut config: PipeboardConfig = toml::from_str(&raw).map_err(|err| {
        ConfigError::configuration(format!(
            "Failed to parse PIPEBOARD_CONFIG from {}: {err}",
            path.display()
        ))
    })?;

    let changed = normalize_config(&mut config);
    if changed {
        persist_config(path, &config)?;
    }

    Ok(config)
}

fn normalize_config(config: &mut PipeboardConfig) -> bool {
    let mut changed = false;

    changed |= normalize_non_empty_string(&mut config.gitlab.base_api_url, default_base_api_url());
    let trimmed_stream = config.gitlab.stream_url.trim();
    if trimmed_stream != config.gitlab.stream_url {
        config.gitlab.stream_url = trimmed_stream.to_owned();
        changed = true;
    }

    let normalized_fetch_timeout = if config.runtime.fetch_timeout_secs == 0 {
        default_fetch_timeout_secs()
    } else {
        config.runtime.fetch_timeout_secs.clamp(1, 300)
    };
    if normalized_fetch_timeout != config.runtime.fetch_timeout_secs {
        config.runtime.fetch_timeout_secs = normalized_fetch_timeout;
        changed = true;
    }

    let normalized_buffer_capacity = if config.runtime.push_buffer_capacity == 0 {
        default_push_buffer_capacity()
    } else {
        config.runtime.push_buffer_capacity.clamp(16, 4096)
    };
    if normalized_buffer_capacity != config.runtime.push_buffer_capacity {
        config.runtime.push_buffer_capacity = normalized_buffer_capacity;
        changed = true;
    }

    let normalized_retry_delay = if config.runtime.stream_retry_delay_secs == 0 {
        default_stream_retry_delay_secs()
    } else {
        config.runtime.stream_retry_delay_secs.clamp(1, 60)
    };
    if normalized_retry_delay != config.runtime.stream_retry_delay_secs {
        config.runtime.stream_retry_delay_secs = normalized_retry_delay;
        changed = true;
    }

    changed
}

fn normalize_non_empty_string(value: &mut String, default: String) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        if *value != default {
            *value = default;
            return true;
        }
        return false;
    }

    if trimmed != value {
        *value = trimmed.to_owned();
        return true;
    }
    false
}

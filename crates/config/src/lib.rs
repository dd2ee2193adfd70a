//! Configuration loading, validation, and management for Switchyard.
//!
//! Loads configuration from `~/.switchyard/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.switchyard/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pipeline coordinator settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Message classification settings
    #[serde(default)]
    pub router: RouterConfig,

    /// Response generation settings
    #[serde(default)]
    pub synthesizer: SynthesizerConfig,

    /// Prompt/context assembly settings
    #[serde(default)]
    pub context: ContextConfig,

    /// Long-term memory settings
    #[serde(default)]
    pub memory: MemoryConfig,
}

fn default_true() -> bool {
    true
}
fn default_history_length() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Persist every exchange to long-term memory and session history
    #[serde(default = "default_true")]
    pub store_interactions: bool,

    /// How many history messages go into each context frame
    #[serde(default = "default_history_length")]
    pub max_history_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            store_interactions: true,
            max_history_length: default_history_length(),
        }
    }
}

/// Which routing strategy classifies messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouterStrategy {
    /// Deterministic pattern matching
    #[default]
    Rules,
    /// Ask the configured provider, fall back to rules
    Delegated,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub strategy: RouterStrategy,
}

/// Which synthesis strategy writes the reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesizerStrategy {
    /// Canned and assembled text
    #[default]
    Template,
    /// Ask the configured provider, fall back to templates
    Delegated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    #[serde(default)]
    pub strategy: SynthesizerStrategy,

    /// Upper bound on delegated output, in characters
    #[serde(default = "default_max_response_length")]
    pub max_response_length: usize,
}

fn default_max_response_length() -> usize {
    2000
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            strategy: SynthesizerStrategy::default(),
            max_response_length: default_max_response_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_history_length")]
    pub max_history_length: usize,

    #[serde(default = "default_true")]
    pub include_timestamps: bool,

    #[serde(default)]
    pub include_tool_metadata: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_history_length: default_history_length(),
            include_timestamps: true,
            include_tool_metadata: false,
        }
    }
}

/// Where long-term memory lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryBackendKind {
    /// Process-local, lost on exit
    #[default]
    InMemory,
    /// JSONL file per namespace
    File,
    /// Store nothing
    None,
}

impl std::str::FromStr for MemoryBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_memory" | "memory" => Ok(Self::InMemory),
            "file" => Ok(Self::File),
            "none" => Ok(Self::None),
            other => Err(ConfigError::ValidationError(format!(
                "unknown memory backend '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub backend: MemoryBackendKind,

    /// Namespace (group) that episodes are saved and searched under
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Directory for the file backend; defaults to `~/.switchyard/memory`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Words kept in an extractive summary
    #[serde(default = "default_summary_words")]
    pub summary_words: usize,

    #[serde(default = "default_search_limit")]
    pub default_search_limit: usize,
}

fn default_namespace() -> String {
    "switchyard-conversations".into()
}
fn default_summary_words() -> usize {
    10
}
fn default_search_limit() -> usize {
    5
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: MemoryBackendKind::default(),
            namespace: default_namespace(),
            path: None,
            summary_words: default_summary_words(),
            default_search_limit: default_search_limit(),
        }
    }
}

impl MemoryConfig {
    /// Directory the file backend writes into.
    pub fn memory_dir(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("memory"))
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.switchyard/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `SWITCHYARD_MEMORY_BACKEND`
    /// - `SWITCHYARD_MEMORY_NAMESPACE`
    /// - `SWITCHYARD_STORE_INTERACTIONS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from a path, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        if let Ok(backend) = std::env::var("SWITCHYARD_MEMORY_BACKEND") {
            config.memory.backend = backend.parse()?;
        }

        if let Ok(namespace) = std::env::var("SWITCHYARD_MEMORY_NAMESPACE") {
            config.memory.namespace = namespace;
        }

        if let Ok(store) = std::env::var("SWITCHYARD_STORE_INTERACTIONS") {
            config.pipeline.store_interactions = parse_bool(&store).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "SWITCHYARD_STORE_INTERACTIONS must be true/false, got '{store}'"
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".switchyard")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.max_history_length == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.max_history_length must be > 0".into(),
            ));
        }

        if self.context.max_history_length == 0 {
            return Err(ConfigError::ValidationError(
                "context.max_history_length must be > 0".into(),
            ));
        }

        if self.memory.summary_words == 0 {
            return Err(ConfigError::ValidationError(
                "memory.summary_words must be > 0".into(),
            ));
        }

        if self.memory.namespace.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "memory.namespace must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

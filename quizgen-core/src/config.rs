//! Configuration management for Quizgen.
//!
//! Configuration is loaded in order of precedence:
//! 1. Defaults
//! 2. Config file (~/.quizgen/config.toml)
//! 3. Environment variables
//! 4. CLI flags (handled at CLI layer)
//!
//! The Gemini API key is only ever read from the environment (`API_KEY`)
//! and is never written back to the config file.

use crate::model::Difficulty;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "API_KEY";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("API_KEY is not set in environment variables. Please ensure it's configured.")]
    MissingApiKey,
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model used for quiz generation
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Generative Language REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (0 = no timeout)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// API key, taken from the environment only
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body size (uploads included)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Quiz generation defaults and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Multiple-choice questions requested when the caller does not say
    #[serde(default = "default_mcq")]
    pub default_mcq: u32,

    /// True/false questions requested when the caller does not say
    #[serde(default = "default_tf")]
    pub default_tf: u32,

    #[serde(default)]
    pub default_difficulty: Difficulty,

    /// Upper bound for each question count
    #[serde(default = "default_max_questions_per_type")]
    pub max_questions_per_type: u32,

    /// Reject generated quizzes whose questions break the MCQ/TF shape rules
    #[serde(default = "default_strict_validation")]
    pub strict_validation: bool,
}

fn default_mcq() -> u32 {
    5
}

fn default_tf() -> u32 {
    3
}

fn default_max_questions_per_type() -> u32 {
    20
}

fn default_strict_validation() -> bool {
    true
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_mcq: default_mcq(),
            default_tf: default_tf(),
            default_difficulty: Difficulty::default(),
            max_questions_per_type: default_max_questions_per_type(),
            strict_validation: default_strict_validation(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Returns the default Quizgen configuration directory (~/.quizgen)
    pub fn quizgen_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".quizgen"))
    }

    /// Returns the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        Self::quizgen_dir().map(|d| d.join("config.toml"))
    }

    /// Load configuration from the default path with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_config_path().filter(|p| p.exists());
        Self::load_layered(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load configuration from an explicit file with environment overrides
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        Self::load_layered(Some(path), |key| std::env::var(key).ok())
    }

    fn load_layered<F>(path: Option<&Path>, var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Config::default(),
        };

        config.apply_overrides_from(var);

        Ok(config)
    }

    /// Load configuration from a specific file (no environment overrides)
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = var(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.gemini.api_key = Some(key);
        }

        if let Some(model) = var("QUIZGEN_MODEL") {
            self.gemini.model = model;
        }

        if let Some(host) = var("QUIZGEN_HOST") {
            self.server.host = host;
        }

        // QUIZGEN_PORT wins over the conventional PORT
        if let Some(port) = var("QUIZGEN_PORT")
            .or_else(|| var("PORT"))
            .and_then(|p| p.parse().ok())
        {
            self.server.port = port;
        }

        if let Some(level) = var("QUIZGEN_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// The Gemini API key; absence is fatal for anything that talks to the provider
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.gemini
            .api_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;
        if generation.default_mcq > generation.max_questions_per_type
            || generation.default_tf > generation.max_questions_per_type
        {
            return Err(ConfigError::ValidationError(format!(
                "default question counts must not exceed max_questions_per_type ({})",
                generation.max_questions_per_type
            )));
        }
        if generation.default_mcq == 0 && generation.default_tf == 0 {
            return Err(ConfigError::ValidationError(
                "default_mcq and default_tf cannot both be 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(path) = Self::default_config_path() {
            self.save_to_file(&path)
        } else {
            Err(ConfigError::ValidationError(
                "Could not determine config path".to_string(),
            ))
        }
    }

    /// Save configuration to a specific file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get the server URL
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }

    /// Ensure the Quizgen directory exists
    pub fn ensure_dirs() -> std::io::Result<()> {
        if let Some(dir) = Self::quizgen_dir() {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.gemini.timeout_secs, 120);
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.generation.default_mcq, 5);
        assert_eq!(config.generation.default_tf, 3);
        assert_eq!(config.generation.default_difficulty, Difficulty::Medium);
        assert_eq!(config.generation.max_questions_per_type, 20);
        assert!(config.generation.strict_validation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[server]
port = 9999

[generation]
default_difficulty = "Hard"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.generation.default_difficulty, Difficulty::Hard);
        // Defaults still applied
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_lowercase_difficulty_in_file() {
        let config: Config =
            toml::from_str("[generation]\ndefault_difficulty = \"hard\"").unwrap();
        assert_eq!(config.generation.default_difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_layered_load_applies_env_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[gemini]\nmodel = \"from-file\"\n\n[generation]\ndefault_difficulty = \"easy\"\n",
        )
        .unwrap();

        let vars = env(&[("API_KEY", "abc"), ("QUIZGEN_MODEL", "from-env")]);
        let config = Config::load_layered(Some(&path), |k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.require_api_key().unwrap(), "abc");
        assert_eq!(config.gemini.model, "from-env");
        assert_eq!(config.generation.default_difficulty, Difficulty::Easy);

        // No file: defaults plus environment
        let config = Config::load_layered(None, |k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.require_api_key().unwrap(), "abc");
        assert_eq!(config.generation.default_difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_layered_load_reports_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[generation]\ndefault_difficulty = \"extreme\"\n").unwrap();

        let result = Config::load_layered(Some(&path), |_| None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.gemini.api_key = Some("secret-key".to_string());
        let toml_str = toml::to_string(&config).unwrap();
        assert!(!toml_str.contains("secret-key"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert!(parsed.gemini.api_key.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("API_KEY", "abc123"),
            ("QUIZGEN_MODEL", "gemini-2.5-pro"),
            ("PORT", "8080"),
            ("QUIZGEN_LOG_LEVEL", "debug"),
        ]);
        let mut config = Config::default();
        config.apply_overrides_from(|k| vars.get(k).cloned());

        assert_eq!(config.require_api_key().unwrap(), "abc123");
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_quizgen_port_beats_port() {
        let vars = env(&[("PORT", "8080"), ("QUIZGEN_PORT", "9090")]);
        let mut config = Config::default();
        config.apply_overrides_from(|k| vars.get(k).cloned());
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_missing_or_blank_api_key() {
        let mut config = Config::default();
        assert!(matches!(
            config.require_api_key(),
            Err(ConfigError::MissingApiKey)
        ));

        let vars = env(&[("API_KEY", "   ")]);
        config.apply_overrides_from(|k| vars.get(k).cloned());
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_defaults() {
        let mut config = Config::default();
        config.generation.default_mcq = 0;
        config.generation.default_tf = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.generation.default_mcq = 21;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.generation.max_questions_per_type = u32::MAX;
        config.generation.default_mcq = u32::MAX;
        config.generation.default_tf = u32::MAX;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.server.port = 4000;
        config.generation.strict_validation = false;
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.server.port, 4000);
        assert!(!loaded.generation.strict_validation);
    }
}

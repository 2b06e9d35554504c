//! Probe configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, a YAML
//! file, the `OLLAMA_HOST` environment variable, then CLI flags (applied by
//! the caller through the `with_*` methods).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::prompts::STEERING_ANGLE_PROMPT;
use crate::providers::{GenerationOptions, DEFAULT_OLLAMA_URL};

/// Environment variable Ollama itself uses for its address.
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "llava";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for probing vision models.
///
/// The accepted angle range is fixed at `[-180, 180]` and is not configurable;
/// unknown keys such as `range` are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Ollama server address
    pub base_url: String,

    /// Models to probe, in order
    pub models: Vec<String>,

    /// Prompt sent with the image
    pub prompt: String,

    /// Per-request timeout (e.g. "2m", "90s")
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,

    /// Sampling options
    pub options: GenerationOptions,

    /// How long the server keeps the model loaded between calls
    pub keep_alive: Option<String>,

    /// Accept the first number found in the text instead of a bare number
    pub lenient: bool,
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            models: vec![DEFAULT_MODEL.to_string()],
            prompt: STEERING_ANGLE_PROMPT.to_string(),
            timeout: Duration::from_secs(120),
            options: GenerationOptions::default(),
            keep_alive: Some("10m".to_string()),
            lenient: false,
        }
    }
}

impl ProbeConfig {
    /// Parse configuration from a YAML string. Missing keys take defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Apply `OLLAMA_HOST` if it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(OLLAMA_HOST_ENV) {
            Ok(host) if !host.trim().is_empty() => self.with_base_url(normalize_host(&host)),
            _ => self,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Replace the model list. An empty list keeps the current one.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        if !models.is_empty() {
            self.models = models;
        }
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::Invalid("at least one model is required".to_string()));
        }
        if self.models.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid("model names must not be empty".to_string()));
        }
        if self.prompt.trim().is_empty() {
            return Err(ConfigError::Invalid("prompt must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Turn an `OLLAMA_HOST` value into a URL: `0.0.0.0:11434` → `http://0.0.0.0:11434`.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.models, vec!["llava".to_string()]);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.keep_alive.as_deref(), Some("10m"));
        assert!(!config.lenient);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = ProbeConfig::from_yaml(
            r#"
models:
  - llava
  - moondream
timeout: 90s
options:
  temperature: 0.2
  num_predict: 16
"#,
        )
        .unwrap();

        assert_eq!(config.models, vec!["llava", "moondream"]);
        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.options.num_predict, Some(16));
        assert_eq!(config.options.num_ctx, None);
        assert_eq!(config.base_url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.prompt, STEERING_ANGLE_PROMPT);
    }

    #[test]
    fn test_from_yaml_bad_duration() {
        let result = ProbeConfig::from_yaml("timeout: soon");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }

    #[test]
    fn test_from_yaml_rejects_empty_models() {
        let result = ProbeConfig::from_yaml("models: []");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_yaml_rejects_range_key() {
        let result = ProbeConfig::from_yaml("range: { min: -360, max: 360 }");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }

    #[test]
    fn test_from_yaml_rejects_misspelled_key() {
        let result = ProbeConfig::from_yaml("model: llava");
        assert!(matches!(result, Err(ConfigError::YamlError(_))));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.yaml");
        fs::write(&path, "base_url: http://gpu-box:11434\nlenient: true\n").unwrap();

        let config = ProbeConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.base_url, "http://gpu-box:11434");
        assert!(config.lenient);
    }

    #[test]
    fn test_missing_file() {
        let result = ProbeConfig::from_yaml_file("/no/such/probe.yaml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_builders() {
        let config = ProbeConfig::default()
            .with_models(vec![])
            .with_base_url("http://example:1")
            .with_timeout(Duration::from_secs(5))
            .with_lenient(true);
        assert_eq!(config.models, vec!["llava".to_string()]);
        assert_eq!(config.base_url, "http://example:1");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.lenient);
    }

    #[test]
    fn test_timeout_serializes_human_readable() {
        let yaml = serde_yaml::to_string(&ProbeConfig::default()).unwrap();
        assert!(yaml.contains("timeout: 2m"));
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("0.0.0.0:11434"), "http://0.0.0.0:11434");
        assert_eq!(normalize_host("https://ollama.lan/"), "https://ollama.lan");
        assert_eq!(normalize_host(" localhost:11434 "), "http://localhost:11434");
    }
}

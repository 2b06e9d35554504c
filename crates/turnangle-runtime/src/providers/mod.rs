//! Vision model provider abstractions.
//!
//! A provider takes an image plus a prompt and returns the model's text.
//! It knows nothing about steering angles; validation happens in the probe.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "ollama")]
mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::OllamaProvider;

/// Default address of a local Ollama server.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Errors from vision providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Could not connect to model server: {0}")]
    Unreachable(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Model '{0}' not found (try: ollama pull {0})")]
    ModelNotFound(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// True when the server could not be reached at all.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ProviderError::Unreachable(_) | ProviderError::Timeout(_))
    }
}

/// Sampling options forwarded to the model server.
///
/// Unset fields are omitted so the server's defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum tokens to predict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,

    /// Context window size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerationOptions {
    pub fn is_empty(&self) -> bool {
        self.num_predict.is_none() && self.num_ctx.is_none() && self.temperature.is_none()
    }
}

/// A single image + prompt generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Model name, e.g. "llava"
    pub model: String,

    /// Prompt text
    pub prompt: String,

    /// Base64-encoded images
    pub images: Vec<String>,

    /// Sampling options
    pub options: GenerationOptions,

    /// How long the server keeps the model loaded, e.g. "10m"
    pub keep_alive: Option<String>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            images: Vec::new(),
            options: GenerationOptions::default(),
            keep_alive: None,
        }
    }

    pub fn with_image(mut self, base64: impl Into<String>) -> Self {
        self.images.push(base64.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: Option<String>) -> Self {
        self.keep_alive = keep_alive;
        self
    }
}

/// Text returned by the model.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// Generated text, unmodified
    pub response: String,

    /// Model that answered
    pub model: String,

    /// Whether generation finished
    pub done: bool,

    /// Server-side duration
    pub total_duration: Option<Duration>,

    /// Tokens generated
    pub eval_count: Option<u32>,
}

/// Provider abstraction allows swapping model servers.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send the prompt and images, return the generated text.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError>;

    /// Check if the server is reachable.
    async fn health_check(&self) -> bool;

    /// Get provider name for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = GenerateRequest::new("llava", "angle?")
            .with_image("aGVsbG8=")
            .with_keep_alive(Some("10m".to_string()));

        assert_eq!(request.model, "llava");
        assert_eq!(request.images, vec!["aGVsbG8=".to_string()]);
        assert_eq!(request.keep_alive.as_deref(), Some("10m"));
        assert!(request.options.is_empty());
    }

    #[test]
    fn test_options_skip_unset_fields() {
        let options = GenerationOptions {
            temperature: Some(0.2),
            ..Default::default()
        };
        let json = serde_json::to_value(&options).unwrap();
        let fields = json.as_object().unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("temperature"));
    }

    #[test]
    fn test_connection_failure_classification() {
        assert!(ProviderError::Unreachable("refused".into()).is_connection_failure());
        assert!(ProviderError::Timeout(Duration::from_secs(1)).is_connection_failure());
        assert!(!ProviderError::ModelNotFound("llava".into()).is_connection_failure());
    }

    #[test]
    fn test_model_not_found_message_has_hint() {
        let msg = ProviderError::ModelNotFound("moondream".into()).to_string();
        assert!(msg.contains("ollama pull moondream"));
    }
}

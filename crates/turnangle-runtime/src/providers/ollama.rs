//! Ollama provider implementation.
//!
//! Talks to the non-streaming `/api/generate` endpoint of a local Ollama
//! server. Images travel as base64 strings inside the JSON body.

use super::{
    GenerateRequest, GenerateResponse, GenerationOptions, ProviderError, VisionProvider,
    DEFAULT_OLLAMA_URL,
};
use crate::config::ProbeConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama HTTP provider.
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for OllamaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaProvider")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OllamaProvider {
    /// Create a provider for the server at `base_url`.
    ///
    /// `timeout` bounds each whole request, including model load time.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ProviderError::NotConfigured(format!(
                "base_url must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Provider for `http://localhost:11434` with the default timeout.
    pub fn local() -> Result<Self, ProviderError> {
        Self::new(DEFAULT_OLLAMA_URL, ProbeConfig::default().timeout)
    }

    /// Create from probe configuration.
    pub fn from_config(config: &ProbeConfig) -> Result<Self, ProviderError> {
        Self::new(config.base_url.clone(), config.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Unreachable(err.to_string())
        }
    }
}

/// Ollama `/api/generate` request body.
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "no_images")]
    images: &'a [String],
    stream: bool,
    #[serde(skip_serializing_if = "no_options")]
    options: &'a GenerationOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<&'a str>,
}

fn no_images(images: &&[String]) -> bool {
    images.is_empty()
}

fn no_options(options: &&GenerationOptions) -> bool {
    options.is_empty()
}

impl<'a> From<&'a GenerateRequest> for OllamaGenerateRequest<'a> {
    fn from(request: &'a GenerateRequest) -> Self {
        Self {
            model: &request.model,
            prompt: &request.prompt,
            images: &request.images,
            stream: false,
            options: &request.options,
            keep_alive: request.keep_alive.as_deref(),
        }
    }
}

/// Ollama `/api/generate` response body (non-streaming).
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    model: String,
    response: Option<String>,
    #[serde(default)]
    done: bool,
    /// Nanoseconds
    total_duration: Option<u64>,
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

fn parse_generate_body(body: &[u8], requested_model: &str) -> Result<GenerateResponse, ProviderError> {
    let parsed: OllamaGenerateResponse =
        serde_json::from_slice(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;

    let response = parsed.response.ok_or_else(|| {
        ProviderError::ParseError("response envelope has no 'response' field".to_string())
    })?;

    let model = if parsed.model.is_empty() {
        requested_model.to_string()
    } else {
        parsed.model
    };

    Ok(GenerateResponse {
        response,
        model,
        done: parsed.done,
        total_duration: parsed.total_duration.map(Duration::from_nanos),
        eval_count: parsed.eval_count,
    })
}

fn error_from_status(status: u16, body: &str, model: &str) -> ProviderError {
    if status == 404 {
        return ProviderError::ModelNotFound(model.to_string());
    }

    let message = serde_json::from_str::<OllamaError>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.trim().to_string());

    ProviderError::ApiError { status, message }
}

#[async_trait]
impl VisionProvider for OllamaProvider {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest::from(request);

        tracing::debug!(
            url = %url,
            model = %request.model,
            images = request.images.len(),
            "Sending generate request"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %text, "Ollama returned an error");
            return Err(error_from_status(status.as_u16(), &text, &request.model));
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;

        parse_generate_body(&bytes, &request.model).map_err(|e| {
            tracing::error!(
                raw_response = %String::from_utf8_lossy(&bytes),
                "Failed to parse Ollama JSON"
            );
            e
        })
    }

    async fn health_check(&self) -> bool {
        match self.client.get(&self.base_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Ollama health check failed");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

//! # turnangle-runtime
//!
//! Vision-model probing for turnangle.
//!
//! This crate owns everything around the validator in `turnangle-core`:
//! loading the image, talking to the model server, and turning the reply
//! into a [`ProbeReport`].
//!
//! ## Important
//!
//! The HTTP provider is behind the `ollama` feature, which is on by default.
//! With default features off, only the [`VisionProvider`] trait and the probe
//! logic are available, which is enough to drive the probe from a custom
//! provider.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use turnangle_runtime::{AngleProbe, ImagePayload, OllamaProvider, ProbeConfig};
//!
//! let config = ProbeConfig::default().with_env_overrides();
//! let provider = Arc::new(OllamaProvider::from_config(&config)?);
//! let probe = AngleProbe::new(provider, config)?;
//!
//! let image = ImagePayload::from_path("car-on-road.png")?;
//! let report = probe.probe("llava", &image).await?;
//! println!("{:?}", report.verdict);
//! ```

use thiserror::Error;

pub mod config;
pub mod dataset;
pub mod image;
pub mod probe;
pub mod prompts;
pub mod providers;

pub use config::{ConfigError, ProbeConfig, DEFAULT_MODEL, OLLAMA_HOST_ENV};
pub use dataset::{load_dataset, DatasetCase, DatasetError};
pub use image::{ImageError, ImagePayload};
pub use probe::{rank, summarize, AngleProbe, ModelSummary, ProbeOutcome, ProbeReport};
pub use prompts::STEERING_ANGLE_PROMPT;
pub use providers::{
    GenerateRequest, GenerateResponse, GenerationOptions, ProviderError, VisionProvider,
    DEFAULT_OLLAMA_URL,
};

#[cfg(feature = "ollama")]
pub use providers::OllamaProvider;

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

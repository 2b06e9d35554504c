//! Probe orchestration: image + prompt in, verdict out.
//!
//! The probe is the only place where provider output meets the validator.
//! Every configured model is run over every image, one request at a time; a
//! failure for one case does not stop the others.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use turnangle_core::{parse_angle, AngleValidator, Verdict};

use crate::config::ProbeConfig;
use crate::image::ImagePayload;
use crate::providers::{GenerateRequest, ProviderError, VisionProvider};
use crate::RuntimeError;

/// Outcome of one successful round trip to one model.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// Model that was asked
    pub model: String,

    /// Image that was sent
    pub image: String,

    /// Text exactly as the model returned it
    pub raw_response: String,

    /// Validation verdict for the text
    pub verdict: Verdict,

    /// Wall-clock time of the request
    #[serde(rename = "elapsed_ms", serialize_with = "duration_millis")]
    pub elapsed: Duration,

    /// When the probe completed
    pub probed_at: DateTime<Utc>,
}

fn duration_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Result of one model/image case in [`AngleProbe::probe_all`].
#[derive(Debug)]
pub struct ProbeOutcome {
    pub model: String,
    pub image: String,
    pub result: Result<ProbeReport, ProviderError>,
}

impl ProbeOutcome {
    pub fn passed(&self) -> bool {
        matches!(&self.result, Ok(report) if report.verdict.is_pass())
    }
}

/// Aggregate results of one model over all images.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub model: String,

    /// Cases attempted, including those that errored
    pub cases: usize,

    /// Cases with a `Pass` verdict
    pub passed: usize,

    /// Cases where the provider returned an error
    pub errors: usize,

    /// Mean request time over cases that got a reply
    #[serde(rename = "mean_elapsed_ms", serialize_with = "duration_millis")]
    pub mean_elapsed: Duration,
}

impl ModelSummary {
    /// Fraction of cases that passed, in `[0, 1]`.
    pub fn pass_rate(&self) -> f64 {
        if self.cases == 0 {
            0.0
        } else {
            self.passed as f64 / self.cases as f64
        }
    }
}

/// Sends images and the steering prompt to a provider and validates the replies.
pub struct AngleProbe {
    provider: Arc<dyn VisionProvider>,
    config: ProbeConfig,
    validator: AngleValidator,
}

impl AngleProbe {
    /// Create a probe. Fails if the configuration is invalid.
    pub fn new(provider: Arc<dyn VisionProvider>, config: ProbeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        Ok(Self {
            provider,
            config,
            validator: AngleValidator::new(),
        })
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe a single model with a single image.
    pub async fn probe(&self, model: &str, image: &ImagePayload) -> Result<ProbeReport, ProviderError> {
        let request = GenerateRequest::new(model, self.config.prompt.clone())
            .with_image(image.base64())
            .with_options(self.config.options.clone())
            .with_keep_alive(self.config.keep_alive.clone());

        tracing::info!(
            provider = self.provider.name(),
            model = %model,
            image = %image.source(),
            image_bytes = image.byte_len(),
            "Sending probe"
        );

        let started = Instant::now();
        let response = self.provider.generate(&request).await?;
        let elapsed = started.elapsed();

        let verdict = if self.config.lenient {
            self.validator.validate_lenient(&response.response)
        } else {
            self.validator.validate(&response.response)
        };

        if let Err(reason) = parse_angle(&response.response) {
            tracing::debug!(model = %model, reason = %reason, "Response is not a bare number");
        }

        tracing::info!(
            model = %model,
            elapsed_ms = elapsed.as_millis() as u64,
            eval_count = ?response.eval_count,
            verdict = ?verdict,
            "Probe complete"
        );

        Ok(ProbeReport {
            model: model.to_string(),
            image: image.source().to_string(),
            raw_response: response.response,
            verdict,
            elapsed,
            probed_at: Utc::now(),
        })
    }

    /// Probe every configured model with every image, model by model.
    pub async fn probe_all(&self, images: &[ImagePayload]) -> Vec<ProbeOutcome> {
        let mut outcomes = Vec::with_capacity(self.config.models.len() * images.len());

        for model in &self.config.models {
            for image in images {
                let result = self.probe(model, image).await;
                if let Err(e) = &result {
                    tracing::warn!(model = %model, image = %image.source(), error = %e, "Probe failed");
                }
                outcomes.push(ProbeOutcome {
                    model: model.clone(),
                    image: image.source().to_string(),
                    result,
                });
            }
        }

        outcomes
    }
}

/// Fold outcomes into one summary per model, in first-seen order.
pub fn summarize(outcomes: &[ProbeOutcome]) -> Vec<ModelSummary> {
    let mut summaries: Vec<(ModelSummary, Duration)> = Vec::new();

    for outcome in outcomes {
        let idx = match summaries.iter().position(|(s, _)| s.model == outcome.model) {
            Some(idx) => idx,
            None => {
                summaries.push((
                    ModelSummary {
                        model: outcome.model.clone(),
                        cases: 0,
                        passed: 0,
                        errors: 0,
                        mean_elapsed: Duration::ZERO,
                    },
                    Duration::ZERO,
                ));
                summaries.len() - 1
            }
        };

        let (summary, total) = &mut summaries[idx];
        summary.cases += 1;
        match &outcome.result {
            Ok(report) => {
                *total += report.elapsed;
                if report.verdict.is_pass() {
                    summary.passed += 1;
                }
            }
            Err(_) => summary.errors += 1,
        }
    }

    summaries
        .into_iter()
        .map(|(mut summary, total)| {
            let replies = (summary.cases - summary.errors) as u32;
            if replies > 0 {
                summary.mean_elapsed = total / replies;
            }
            summary
        })
        .collect()
}

/// Order summaries best first: highest pass rate, then fastest mean time.
pub fn rank(summaries: &mut [ModelSummary]) {
    summaries.sort_by(|a, b| {
        b.pass_rate()
            .total_cmp(&a.pass_rate())
            .then(a.mean_elapsed.cmp(&b.mean_elapsed))
    });
}

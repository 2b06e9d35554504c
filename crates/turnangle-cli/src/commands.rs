//! Subcommand arguments and handlers.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use turnangle_core::{AngleRange, AngleValidator};
use turnangle_runtime::{
    load_dataset, rank, summarize, AngleProbe, ImagePayload, OllamaProvider, ProbeConfig,
    VisionProvider,
};

use crate::exit::CliExitCode;
use crate::render::{connection_help, outcomes_json, ranking_table, verdict_message};

/// Image used when neither `--image` nor `--dataset` is given.
pub const DEFAULT_IMAGE: &str = "car-on-road.png";

/// Options shared by commands that talk to the server.
#[derive(Args, Debug, Clone, Default)]
pub struct ServerArgs {
    /// Ollama server URL (overrides config file and OLLAMA_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// YAML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Raw model response to validate
    #[arg(conflicts_with = "stdin", allow_hyphen_values = true)]
    pub response: Option<String>,

    /// Read the response from standard input
    #[arg(long)]
    pub stdin: bool,

    /// Accept the first number found anywhere in the text
    #[arg(long)]
    pub lenient: bool,

    /// Print the verdict as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Road image to send to the model; repeat to test several images
    #[arg(long = "image", short = 'i')]
    pub images: Vec<PathBuf>,

    /// JSON dataset listing the images to test
    #[arg(long, conflicts_with = "images")]
    pub dataset: Option<PathBuf>,

    /// Model to probe; repeat to compare several models
    #[arg(long = "model", short = 'm')]
    pub models: Vec<String>,

    /// Replace the default steering prompt
    #[arg(long)]
    pub prompt: Option<String>,

    /// Per-request timeout, e.g. "2m" or "90s"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Accept the first number found anywhere in the text
    #[arg(long)]
    pub lenient: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub server: ServerArgs,
}

/// Build the effective configuration: defaults, file, environment, flags.
pub fn resolve_config(server: &ServerArgs) -> Result<ProbeConfig> {
    let config = match &server.config {
        Some(path) => load_config_file(path)?,
        None => ProbeConfig::default(),
    };

    let config = config.with_env_overrides();

    Ok(match &server.host {
        Some(host) => config.with_base_url(turnangle_runtime::config::normalize_host(host)),
        None => config,
    })
}

fn load_config_file(path: &Path) -> Result<ProbeConfig> {
    ProbeConfig::from_yaml_file(path)
        .with_context(|| format!("Failed to load config {}", path.display()))
}

/// Image paths to probe: the dataset, the `--image` list, or the default image.
pub fn image_paths(images: &[PathBuf], dataset: Option<&Path>) -> Result<Vec<PathBuf>> {
    if let Some(dataset) = dataset {
        return Ok(load_dataset(dataset)?);
    }
    if images.is_empty() {
        return Ok(vec![PathBuf::from(DEFAULT_IMAGE)]);
    }
    Ok(images.to_vec())
}

/// `turnangle validate`
pub fn handle_validate(args: ValidateArgs) -> Result<CliExitCode> {
    let raw = match (args.response, args.stdin) {
        (Some(response), _) => response,
        (None, true) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read response from stdin")?;
            buf
        }
        (None, false) => bail!("Provide a response argument or --stdin"),
    };

    let validator = AngleValidator::new();
    let verdict = if args.lenient {
        validator.validate_lenient(&raw)
    } else {
        validator.validate(&raw)
    };

    tracing::debug!(verdict = ?verdict, lenient = args.lenient, "Validated response");

    if args.json {
        println!("{}", serde_json::to_string(&verdict)?);
    } else {
        println!("{}", verdict_message(&verdict, validator.range()));
    }

    Ok(CliExitCode::from(&verdict))
}

/// `turnangle probe`
pub async fn handle_probe(args: ProbeArgs) -> Result<CliExitCode> {
    let mut config = resolve_config(&args.server)?
        .with_models(args.models)
        .with_lenient(args.lenient);
    if let Some(prompt) = args.prompt {
        config = config.with_prompt(prompt);
    }
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
    }

    let images = image_paths(&args.images, args.dataset.as_deref())?
        .iter()
        .map(|path| ImagePayload::from_path(path))
        .collect::<Result<Vec<_>, _>>()?;
    let provider = Arc::new(OllamaProvider::from_config(&config)?);
    let probe = AngleProbe::new(provider, config)?;

    if !args.json {
        println!(
            "Sending request to Ollama at {}... (models: {})",
            probe.config().base_url,
            probe.config().models.join(", ")
        );
        for image in &images {
            println!(
                "Image payload {}: {} bytes, base64 chars: {}",
                image.source(),
                image.byte_len(),
                image.base64().len()
            );
        }
    }

    let outcomes = probe.probe_all(&images).await;
    let mut summaries = summarize(&outcomes);
    rank(&mut summaries);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcomes_json(&outcomes, &summaries))?
        );
    }

    let mut code = CliExitCode::Pass;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                if !args.json {
                    println!("\n[{} | {}] Raw LLM response:", report.model, report.image);
                    println!("{}", report.raw_response);
                    println!("\n{}", verdict_message(&report.verdict, AngleRange::STEERING));
                }
                code = code.worst(CliExitCode::from(&report.verdict));
            }
            Err(e) => {
                if e.is_connection_failure() {
                    eprintln!("\n{}", connection_help(&outcome.model));
                }
                eprintln!("\nERROR [{} | {}]: {}", outcome.model, outcome.image, e);
                code = code.worst(CliExitCode::Error);
            }
        }
    }

    if !args.json && outcomes.len() > 1 {
        println!("\n{}", ranking_table(&summaries));
    }

    Ok(code)
}

/// `turnangle health`
pub async fn handle_health(server: ServerArgs) -> Result<CliExitCode> {
    let config = resolve_config(&server)?;
    let provider = OllamaProvider::from_config(&config)?;

    if provider.health_check().await {
        println!("Ollama is running at {}", provider.base_url());
        Ok(CliExitCode::Pass)
    } else {
        eprintln!("Ollama is not reachable at {}", provider.base_url());
        eprintln!("Start it with 'ollama serve'.");
        Ok(CliExitCode::Error)
    }
}

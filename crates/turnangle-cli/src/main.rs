//! turnangle CLI
//!
//! Ask a local vision model for a steering angle and check the answer.
//!
//! # Commands
//!
//! - `validate`: check a response string offline
//! - `probe`: send an image to one or more Ollama models and validate each reply
//! - `health`: check that the Ollama server is reachable
//!
//! Results go to stdout, logs to stderr. Exit code 0 means every verdict
//! passed, 1 means a verdict failed, 2 means the run could not complete.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod exit;
mod render;

use exit::CliExitCode;

/// Steering-angle probe for local vision models
#[derive(Parser)]
#[command(name = "turnangle")]
#[command(version)]
#[command(about = "Ask a local vision model for a steering angle and validate the answer")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a raw model response without contacting a server
    Validate(commands::ValidateArgs),
    /// Send an image and the steering prompt to Ollama models
    Probe(commands::ProbeArgs),
    /// Check that the Ollama server is reachable
    Health(commands::ServerArgs),
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Validate(args) => commands::handle_validate(args),
        Commands::Probe(args) => commands::handle_probe(args).await,
        Commands::Health(args) => commands::handle_health(args).await,
    };

    match result {
        Ok(code) => code.into(),
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("ERROR: {:#}", e);
            CliExitCode::Error.into()
        }
    }
}

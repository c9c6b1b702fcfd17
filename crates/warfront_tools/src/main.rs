//! Warfront development tools.
//!
//! # Usage
//!
//! ```bash
//! # Check a scenario for data-integrity problems
//! warfront validate assets/data/skirmish.ron
//!
//! # Drive a headless session from a JSON-lines intent script
//! warfront play assets/data/skirmish.ron assets/data/skirmish.jsonl --config assets/data/core.ron
//! ```
//!
//! Output (stdout): one JSON line per report or combat record
//! Logs (stderr): tracing output, filtered by `RUST_LOG`

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use warfront_tools::{loader, play, validate, Result};

#[derive(Parser)]
#[command(name = "warfront")]
#[command(about = "Development tools for the Warfront tactics core")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario file
    Validate {
        /// Scenario RON file
        scenario: PathBuf,

        /// Core configuration RON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Exit with failure if any issue is found
        #[arg(long)]
        strict: bool,
    },

    /// Play a scripted session and print the combat log
    Play {
        /// Scenario RON file
        scenario: PathBuf,

        /// JSON-lines intent script
        script: PathBuf,

        /// Core configuration RON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for reports
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Validate {
            scenario,
            config,
            strict,
        } => {
            let config = loader::load_config(config.as_deref())?;
            tracing::info!("Validating scenario: {}", scenario.display());
            let report = validate::validate_file(&scenario, &config)?;
            serde_json::to_writer(io::stdout().lock(), &report)?;
            println!();
            if report.is_clean() {
                tracing::info!("Validation passed");
            } else {
                tracing::warn!(issues = report.issues.len(), "Validation found issues");
            }
            Ok(report.is_clean() || !strict)
        }
        Commands::Play {
            scenario,
            script,
            config,
        } => {
            let config = loader::load_config(config.as_deref())?;
            let data = loader::load_scenario(&scenario)?;
            let intents = loader::load_script(&script)?;
            play::run_script(&data, config, &intents, &mut io::stdout().lock())?;
            Ok(true)
        }
    }
}

//! MathSnap - snap a photo of an arithmetic expression, get the answer
//!
//! One image in, one (text, result, confidence) report out: the image is
//! OCR'd, the recognized text normalized into a candidate expression,
//! the expression evaluated, and the result printed.

mod acquire;
mod config;
mod display;
mod eval;
mod normalize;
mod ocr;
mod pipeline;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::acquire::AcquireError;
use crate::config::AppConfig;
use crate::eval::ArithmeticEvaluator;
use crate::ocr::TesseractRecognizer;
use crate::pipeline::{FailureReason, PipelineOutcome};
use crate::session::Session;

/// MathSnap - solve a photographed arithmetic expression
#[derive(Parser, Debug)]
#[command(name = "mathsnap")]
#[command(about = "Extract an arithmetic expression from an image and solve it")]
struct Args {
    /// Path to the image containing the expression
    image: PathBuf,

    /// OCR language (overrides the configured value)
    #[arg(short, long)]
    language: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit the outcome as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut cfg = load_or_create_config(args.config.as_deref());
    if let Some(language) = args.language {
        cfg.ocr.language = language;
    }

    let mut session = Session::new();

    // The input-type check happens before the session ever enters the
    // recognition phase, and is reported distinctly.
    let image = match acquire::load_image(&args.image) {
        Ok(image) => image,
        Err(AcquireError::NotAnImage) => {
            let outcome = PipelineOutcome::Failure {
                reason: FailureReason::InvalidInputType,
            };
            report(&outcome, &cfg, args.json)?;
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err.into()),
    };
    session.acquire();

    let recognizer = TesseractRecognizer::new(&cfg.ocr);
    let evaluator = ArithmeticEvaluator;

    let Some(outcome) = pipeline::run(&mut session, image, &recognizer, &evaluator).await else {
        anyhow::bail!("a recognition run is already in flight");
    };

    report(&outcome, &cfg, args.json)?;
    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Load configuration from the given path, the platform config dir, or
/// fall back to defaults.
fn load_or_create_config(path: Option<&std::path::Path>) -> AppConfig {
    if let Some(path) = path {
        match config::load_config(path) {
            Ok(cfg) => return cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                return AppConfig::default();
            }
        }
    }

    if let Ok(config_dir) = config::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(cfg) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return cfg;
            }
        }
    }
    AppConfig::default()
}

/// Print the outcome: a three-line report on success, a single actionable
/// message on failure, or the raw outcome as JSON.
fn report(outcome: &PipelineOutcome, cfg: &AppConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    match outcome {
        PipelineOutcome::Success {
            detected_text,
            display_value,
            confidence,
        } => {
            println!(
                "{}",
                display::detected_text_line(detected_text, cfg.display.max_text_len)
            );
            println!("{}", display::solution_line(*display_value));
            println!("{}", display::confidence_line(*confidence));
        }
        PipelineOutcome::Failure {
            reason: FailureReason::InvalidInputType,
        } => {
            eprintln!("{}", pipeline::INVALID_INPUT_MESSAGE);
        }
        PipelineOutcome::Failure { .. } => {
            eprintln!("{}", pipeline::FAILURE_MESSAGE);
        }
    }
    Ok(())
}

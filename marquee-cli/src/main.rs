//! Marquee CLI - builds the movie similarity artifacts.
//!
//! Reads the pipeline configuration, installs logging, runs every stage and
//! prints a summary of what was written.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use marquee_core::{Pipeline, PipelineConfig, DEFAULT_CONFIG_PATH};

mod logging;
mod summary;

/// Build content-based movie similarity artifacts.
///
/// Loads the movie and credit tables named in the config, derives a tag
/// string per movie and writes the movie list plus the cosine similarity
/// matrix to the artifacts directory.
#[derive(Parser)]
#[command(name = "marquee")]
#[command(author, version)]
#[command(about = "Build content-based movie similarity artifacts")]
#[command(after_help = "Examples:
  marquee                          Run with configs/config.toml
  marquee -c configs/local.toml    Run with another config")]
pub struct Cli {
    /// Path to the pipeline configuration
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = PipelineConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    logging::setup_logging(&config, cli.verbose, cli.quiet)?;
    tracing::info!("***************************");
    tracing::info!(">>>>>>>>>>> stage   MAIN   started <<<<<<<<<<");

    let spinner = (!cli.quiet).then(summary::create_spinner);
    if let Some(spinner) = &spinner {
        spinner.set_message("Building similarity artifacts...");
    }

    let result = Pipeline::new(config).run();
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    match result {
        Ok(report) => {
            tracing::info!(">>>>>>>>> stage  MAIN   completed <<<<<<<<<<<");
            if !cli.quiet {
                println!("{}", summary::render(&report));
            }
            Ok(())
        }
        Err(err) => {
            tracing::error!(stage = err.stage(), "{}", err);
            Err(err).with_context(|| "Pipeline run failed")
        }
    }
}

//! moodscan - music mood analysis from the command line
//!
//! Three subcommands: `analyze` reports on one file, `batch` summarizes
//! many, `scan` walks a directory into a persistent library cache and
//! prints the filtered library. Diagnostics go to stderr through
//! tracing; stdout carries only the report itself.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moodscan_dsp::{analyze_batch, analyze_file, AnalysisOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod output;
mod scan;

/// Command-line arguments for moodscan
#[derive(Parser, Debug)]
#[command(name = "moodscan")]
#[command(about = "Rule-based music mood and genre analysis")]
#[command(version)]
struct Args {
    /// Log filter, e.g. "info" or "moodscan=debug"
    #[arg(long, global = true, default_value = "warn", env = "MOODSCAN_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze the mood of one audio file
    Analyze {
        /// Path to the audio file
        file: PathBuf,

        /// Include the track duration in the explanation
        #[arg(long)]
        detailed: bool,

        /// Show the five closest genre archetypes
        #[arg(long)]
        similarity: bool,
    },

    /// Analyze multiple audio files
    Batch {
        /// Paths to the audio files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Include the track duration in each explanation
        #[arg(long)]
        detailed: bool,

        /// Compute archetype similarity scores
        #[arg(long)]
        similarity: bool,

        /// Parallel analysis workers (default: available cores)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Scan a directory into the library cache and list it
    Scan {
        /// Directory to walk for audio files
        dir: PathBuf,

        /// Cache file (default: ~/.cache/moodscan/library.json)
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Keep only moods containing this text
        #[arg(long)]
        mood: Option<String>,

        /// Keep only keys containing this text
        #[arg(long)]
        key: Option<String>,

        /// Keep only tempos at or above this BPM
        #[arg(long)]
        tempo_min: Option<f64>,

        /// Keep only tempos at or below this BPM
        #[arg(long)]
        tempo_max: Option<f64>,

        /// Keep only energies at or above this value
        #[arg(long)]
        energy_min: Option<f64>,

        /// Keep only energies at or below this value
        #[arg(long)]
        energy_max: Option<f64>,

        /// Parallel analysis workers (default: available cores)
        #[arg(long)]
        workers: Option<usize>,

        /// Re-analyze every file, ignoring cache hits
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log_level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args.command).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Analyze {
            file,
            detailed,
            similarity,
        } => {
            let opts = AnalysisOptions {
                detailed,
                with_similarity: similarity,
                ..AnalysisOptions::default()
            };
            let analysis = tokio::task::spawn_blocking(move || analyze_file(&file, &opts))
                .await
                .context("analysis task failed")??;
            output::print_analysis(&analysis, similarity);
            Ok(ExitCode::SUCCESS)
        }

        Command::Batch {
            files,
            detailed,
            similarity,
            workers,
        } => {
            let (present, missing): (Vec<_>, Vec<_>) =
                files.into_iter().partition(|p| p.exists());
            for path in &missing {
                tracing::warn!(path = %path.display(), "skipping missing file");
            }

            println!("Analyzing {} files...", present.len());
            let opts = AnalysisOptions {
                detailed,
                with_similarity: similarity,
                ..AnalysisOptions::default()
            };
            let results = analyze_batch(present, opts, workers).await;

            let mut succeeded = 0usize;
            for (path, result) in &results {
                match result {
                    Ok(analysis) => {
                        succeeded += 1;
                        output::print_batch_summary(analysis);
                    }
                    Err(e) => {
                        println!();
                        println!("{}:", path.display());
                        println!("  error: {e}");
                    }
                }
            }

            Ok(if succeeded > 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::Scan {
            dir,
            cache,
            mood,
            key,
            tempo_min,
            tempo_max,
            energy_min,
            energy_max,
            workers,
            refresh,
        } => {
            let cache_path = match cache {
                Some(path) => path,
                None => cache::default_cache_path()?,
            };
            let filters = scan::Filters {
                mood,
                key,
                tempo_min,
                tempo_max,
                energy_min,
                energy_max,
            };
            scan::run(&dir, &cache_path, &filters, workers, refresh).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

//! Default command: process a comma-separated list of images.

use clap::{Args, ValueEnum};
use greypipe_core::{BatchReport, Config, GreypipeError, JobOutcome, Pipeline};
use std::path::PathBuf;

/// Execution strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Four concurrent stages; every image is attempted
    #[default]
    Concurrent,
    /// One image at a time; stops at the first failure
    Sequential,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Concurrent => write!(f, "concurrent"),
            Mode::Sequential => write!(f, "sequential"),
        }
    }
}

/// Arguments for processing images.
#[derive(Args, Debug, Default)]
pub struct ProcessArgs {
    /// Comma-separated list of image paths to process
    #[arg(long, value_delimiter = ',')]
    pub images: Vec<String>,

    /// Execution strategy
    #[arg(long, value_enum, default_value_t = Mode::Concurrent)]
    pub mode: Mode,

    /// Print one JSON object per image instead of text lines
    #[arg(long)]
    pub json: bool,
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, config: &Config) -> anyhow::Result<()> {
    let paths = parse_paths(&args.images);
    if paths.is_empty() {
        anyhow::bail!(
            "no image paths provided.\nUsage: greypipe --images=\"path1.jpg,path2.png\""
        );
    }
    println!("Processing images: {:?}", paths);

    let pipeline = Pipeline::new(config);
    let report = match args.mode {
        Mode::Concurrent => run_concurrent(&pipeline, paths, args.json).await,
        Mode::Sequential => run_sequential(pipeline, paths, args.json).await?,
    };

    tracing::info!(
        "{} run: {}/{} succeeded in {:.2?} ({:.1} img/sec)",
        args.mode,
        report.succeeded(),
        report.total(),
        report.elapsed,
        report.images_per_second()
    );
    report.into_result()?;
    Ok(())
}

/// Stream outcomes as the save stage produces them.
async fn run_concurrent(pipeline: &Pipeline, paths: Vec<PathBuf>, json: bool) -> BatchReport {
    pipeline
        .run_concurrent_with(paths, |outcome| print_outcome(outcome, json))
        .await
}

async fn run_sequential(
    pipeline: Pipeline,
    paths: Vec<PathBuf>,
    json: bool,
) -> anyhow::Result<BatchReport> {
    let result = tokio::task::spawn_blocking(move || pipeline.run_sequential(&paths)).await?;
    match result {
        Ok(report) => {
            for outcome in &report.outcomes {
                print_outcome(outcome, json);
            }
            Ok(report)
        }
        Err(e) => {
            if json {
                let record = serde_json::json!({ "status": "failed", "error": e.to_string() });
                println!("{}", record);
            } else {
                println!("Failed: {}", e);
            }
            Err(GreypipeError::from(e).into())
        }
    }
}

fn print_outcome(outcome: &JobOutcome, json: bool) {
    if json {
        match serde_json::to_string(&outcome.record()) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!(
                "Could not serialize outcome for {:?}: {}",
                outcome.input_path,
                e
            ),
        }
        return;
    }
    match &outcome.result {
        Ok(()) => println!("Success: {}", outcome.out_path.display()),
        Err(e) => println!("Failed: {}", e),
    }
}

/// Trim entries, drop empty ones and expand `~`.
pub(crate) fn parse_paths(raw: &[String]) -> Vec<PathBuf> {
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(Config::expand_path)
        .collect()
}

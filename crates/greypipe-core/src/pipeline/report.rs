//! Per-image outcomes and whole-run reports.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{GreypipeError, PipelineError, PipelineResult, Result};

/// Terminal result for one input image, produced by the save stage.
#[derive(Debug)]
pub struct JobOutcome {
    pub input_path: PathBuf,
    pub out_path: PathBuf,
    pub result: PipelineResult<()>,
}

impl JobOutcome {
    pub fn success(input_path: PathBuf, out_path: PathBuf) -> Self {
        Self {
            input_path,
            out_path,
            result: Ok(()),
        }
    }

    pub fn failure(input_path: PathBuf, out_path: PathBuf, error: PipelineError) -> Self {
        Self {
            input_path,
            out_path,
            result: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&PipelineError> {
        self.result.as_ref().err()
    }

    /// Serializable view of this outcome.
    pub fn record(&self) -> OutcomeRecord {
        OutcomeRecord {
            input: self.input_path.clone(),
            output: non_empty(&self.out_path),
            status: if self.is_success() { "ok" } else { "failed" },
            error: self.error().map(|e| e.to_string()),
        }
    }
}

fn non_empty(path: &Path) -> Option<PathBuf> {
    (!path.as_os_str().is_empty()).then(|| path.to_path_buf())
}

/// One JSON line per image for machine-readable output.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRecord {
    pub input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcomes of a whole run, in the order they were produced.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn new(outcomes: Vec<JobOutcome>, elapsed: Duration) -> Self {
        Self { outcomes, elapsed }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Throughput over the wall-clock time of the run.
    pub fn images_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total() as f64 / secs
        } else {
            0.0
        }
    }

    /// `Ok(self)` if every image succeeded, otherwise an aggregate failure.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GreypipeError::AggregateFailure {
                failed: self.failed(),
                total: self.total(),
            })
        }
    }
}

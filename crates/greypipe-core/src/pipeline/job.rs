//! The unit of work flowing through the pipeline.

use image::DynamicImage;
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::error::{PipelineError, PipelineResult};

use super::channel::run_blocking;

/// Rewrites an input path into its output path by replacing the first
/// occurrence of a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    from: String,
    to: String,
}

impl PathRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Derive the output path for `input`.
    ///
    /// Inputs that do not contain the segment are rejected rather than mapped
    /// onto themselves. Non-UTF-8 inputs are rejected too, since a lossy
    /// conversion could send two inputs to the same output.
    pub fn apply(&self, input: &Path) -> PipelineResult<PathBuf> {
        let raw = input
            .to_str()
            .ok_or_else(|| PipelineError::NonUtf8Path(input.to_path_buf()))?;
        if !raw.contains(self.from.as_str()) {
            return Err(PipelineError::OutputPath {
                path: input.to_path_buf(),
                segment: self.from.clone(),
            });
        }
        Ok(PathBuf::from(raw.replacen(self.from.as_str(), &self.to, 1)))
    }
}

impl Default for PathRewrite {
    fn default() -> Self {
        Self::from(&OutputConfig::default())
    }
}

impl From<&OutputConfig> for PathRewrite {
    fn from(config: &OutputConfig) -> Self {
        Self::new(config.input_segment.clone(), config.output_segment.clone())
    }
}

/// Where a job stands: carrying an image, or poisoned by a terminal error.
#[derive(Debug)]
pub enum JobState {
    Ready(DynamicImage),
    Poisoned(PipelineError),
}

/// One image in flight.
///
/// A job is moved from stage to stage, so exactly one stage owns its image at
/// any time. Once poisoned the image is gone and later stages only forward
/// the job.
#[derive(Debug)]
pub struct Job {
    input_path: PathBuf,
    out_path: PathBuf,
    state: JobState,
}

impl Job {
    /// A job holding a decoded image.
    pub fn ready(input_path: PathBuf, out_path: PathBuf, image: DynamicImage) -> Self {
        Self {
            input_path,
            out_path,
            state: JobState::Ready(image),
        }
    }

    /// A job that failed before (or while) loading.
    ///
    /// `out_path` may be empty when no output path could be derived.
    pub fn poisoned(input_path: PathBuf, out_path: PathBuf, error: PipelineError) -> Self {
        Self {
            input_path,
            out_path,
            state: JobState::Poisoned(error),
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn is_poisoned(&self) -> bool {
        matches!(self.state, JobState::Poisoned(_))
    }

    /// The current image, unless the job is poisoned.
    pub fn image(&self) -> Option<&DynamicImage> {
        match &self.state {
            JobState::Ready(image) => Some(image),
            JobState::Poisoned(_) => None,
        }
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match &self.state {
            JobState::Ready(_) => None,
            JobState::Poisoned(error) => Some(error),
        }
    }

    /// Split into `(input_path, out_path, state)`.
    pub fn into_parts(self) -> (PathBuf, PathBuf, JobState) {
        (self.input_path, self.out_path, self.state)
    }

    /// Run `transform` on the job's image in the blocking pool.
    ///
    /// Poisoned jobs are returned untouched. A failing (or panicking)
    /// transform poisons the job.
    pub async fn apply<F>(self, stage: &'static str, transform: F) -> Job
    where
        F: FnOnce(DynamicImage) -> PipelineResult<DynamicImage> + Send + 'static,
    {
        let Job {
            input_path,
            out_path,
            state,
        } = self;

        let state = match state {
            JobState::Ready(image) => {
                match run_blocking(&input_path, stage, move || transform(image)).await {
                    Ok(image) => JobState::Ready(image),
                    Err(e) => {
                        tracing::debug!("{} failed for {:?}: {}", stage, input_path, e);
                        JobState::Poisoned(e)
                    }
                }
            }
            JobState::Poisoned(e) => {
                tracing::trace!("{}: forwarding poisoned job {:?}", stage, input_path);
                JobState::Poisoned(e)
            }
        };

        Job {
            input_path,
            out_path,
            state,
        }
    }
}

//! Pipeline orchestration: the concurrent staged run and the sequential
//! reference run.

use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::config::{Config, PipelineConfig};
use crate::error::PipelineResult;
use crate::imaging::{codec, transform, BoundingBox};

use super::job::PathRewrite;
use super::report::{BatchReport, JobOutcome};
use super::stages;

/// Resizes and greyscales batches of images, either through four concurrent
/// stages or one image at a time.
#[derive(Debug, Clone)]
pub struct Pipeline {
    channels: PipelineConfig,
    rewrite: PathRewrite,
    bounds: BoundingBox,
    jpeg_quality: u8,
}

impl Pipeline {
    /// Create a pipeline from the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            channels: config.pipeline.clone(),
            rewrite: PathRewrite::from(&config.output),
            bounds: BoundingBox::from(&config.resize),
            jpeg_quality: config.output.jpeg_quality,
        }
    }

    /// Wire load → resize → grayscale → save and return the results channel.
    ///
    /// Must be called from within a tokio runtime. Outcomes arrive in input
    /// order, one per path; the channel closes after the last one.
    pub fn spawn(&self, paths: Vec<PathBuf>) -> mpsc::Receiver<JobOutcome> {
        let loaded = stages::load(paths, self.rewrite.clone(), &self.channels);
        let resized = stages::resize(loaded, self.bounds, &self.channels);
        let gray = stages::grayscale(resized, &self.channels);
        stages::save(gray, self.jpeg_quality, &self.channels)
    }

    /// Run every path through the staged pipeline and collect the outcomes.
    ///
    /// A failing image never stops the others. Use
    /// [`BatchReport::into_result`] to turn any failure into an error.
    pub async fn run_concurrent(&self, paths: Vec<PathBuf>) -> BatchReport {
        self.run_concurrent_with(paths, |_| {}).await
    }

    /// Like [`Pipeline::run_concurrent`], calling `on_outcome` for each image
    /// as soon as the save stage reports it, in input order.
    pub async fn run_concurrent_with<F>(
        &self,
        paths: Vec<PathBuf>,
        mut on_outcome: F,
    ) -> BatchReport
    where
        F: FnMut(&JobOutcome),
    {
        let start = Instant::now();
        let total = paths.len();
        let mut results = self.spawn(paths);

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = results.recv().await {
            log_outcome(&outcome);
            on_outcome(&outcome);
            outcomes.push(outcome);
        }

        let report = BatchReport::new(outcomes, start.elapsed());
        tracing::debug!(
            "Concurrent run: {} succeeded, {} failed in {:?}",
            report.succeeded(),
            report.failed(),
            report.elapsed
        );
        report
    }

    /// Process paths one after another in the calling thread.
    ///
    /// Stops at the first failure; later paths are never touched.
    pub fn run_sequential(&self, paths: &[PathBuf]) -> PipelineResult<BatchReport> {
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(paths.len());

        for path in paths {
            let step = Instant::now();
            let out_path = self.rewrite.apply(path)?;
            let image = codec::decode(path)?;
            let image = transform::resize_to_bounding_box(image, self.bounds);
            let image = transform::to_grayscale(image);
            codec::ensure_parent_dir(&out_path)?;
            codec::encode(&out_path, &image, self.jpeg_quality)?;
            tracing::trace!("  {:?} done in {:?}", path, step.elapsed());

            let outcome = JobOutcome::success(path.clone(), out_path);
            log_outcome(&outcome);
            outcomes.push(outcome);
        }

        Ok(BatchReport::new(outcomes, start.elapsed()))
    }
}

fn log_outcome(outcome: &JobOutcome) {
    match &outcome.result {
        Ok(()) => tracing::debug!("Processed {:?} -> {:?}", outcome.input_path, outcome.out_path),
        Err(e) => tracing::error!("Failed: {:?} - {}", outcome.input_path, e),
    }
}

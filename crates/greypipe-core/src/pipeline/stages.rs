//! The four pipeline stages: load, resize, greyscale, save.
//!
//! Each constructor spawns one tokio task and returns the receiving end of
//! the stage's output channel, ready to feed into the next stage.

use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::PipelineConfig;
use crate::imaging::{codec, transform, BoundingBox};

use super::channel::{run_blocking, stage_channel, PipelineStage};
use super::job::{Job, JobState, PathRewrite};
use super::report::JobOutcome;

/// Entry stage: turn each input path into a decoded (or poisoned) job.
///
/// Jobs are emitted in input order, one per path.
pub fn load(
    paths: Vec<PathBuf>,
    rewrite: PathRewrite,
    config: &PipelineConfig,
) -> mpsc::Receiver<Job> {
    let (tx, rx) = stage_channel(config);
    tokio::spawn(async move {
        let total = paths.len();
        for path in paths {
            let job = load_job(path, &rewrite).await;
            if tx.send(job).await.is_err() {
                tracing::warn!("load stage: downstream closed, stopping");
                return;
            }
        }
        tracing::debug!("load stage drained ({} item(s))", total);
    });
    rx
}

async fn load_job(input_path: PathBuf, rewrite: &PathRewrite) -> Job {
    let out_path = match rewrite.apply(&input_path) {
        Ok(out_path) => out_path,
        Err(e) => return Job::poisoned(input_path, PathBuf::new(), e),
    };

    let decode_path = input_path.clone();
    match run_blocking(&input_path, "load", move || codec::decode(&decode_path)).await {
        Ok(image) => {
            tracing::debug!("Loaded {:?}", input_path);
            Job::ready(input_path, out_path, image)
        }
        Err(e) => Job::poisoned(input_path, out_path, e),
    }
}

/// Shrink each image to fit `bounds`.
pub fn resize(
    input: mpsc::Receiver<Job>,
    bounds: BoundingBox,
    config: &PipelineConfig,
) -> mpsc::Receiver<Job> {
    transform_stage("resize", input, config, move |image| {
        transform::resize_to_bounding_box(image, bounds)
    })
}

/// Convert each image to single-channel luma.
pub fn grayscale(input: mpsc::Receiver<Job>, config: &PipelineConfig) -> mpsc::Receiver<Job> {
    transform_stage("grayscale", input, config, transform::to_grayscale)
}

/// Sink stage: write each ready image to its output path and report the
/// outcome of every job.
pub fn save(
    input: mpsc::Receiver<Job>,
    jpeg_quality: u8,
    config: &PipelineConfig,
) -> mpsc::Receiver<JobOutcome> {
    let (tx, rx) = stage_channel(config);
    let stage = PipelineStage::new("save", input, tx);
    tokio::spawn(stage.run(move |job| save_job(job, jpeg_quality)));
    rx
}

async fn save_job(job: Job, jpeg_quality: u8) -> JobOutcome {
    let (input_path, out_path, state) = job.into_parts();
    match state {
        JobState::Poisoned(e) => JobOutcome::failure(input_path, out_path, e),
        JobState::Ready(image) => {
            let target = out_path.clone();
            let written = run_blocking(&input_path, "save", move || {
                codec::ensure_parent_dir(&target)?;
                codec::encode(&target, &image, jpeg_quality)
            })
            .await;
            match written {
                Ok(()) => JobOutcome::success(input_path, out_path),
                Err(e) => JobOutcome::failure(input_path, out_path, e),
            }
        }
    }
}

// Shared loop for stages whose transform cannot fail.
fn transform_stage<F>(
    name: &'static str,
    input: mpsc::Receiver<Job>,
    config: &PipelineConfig,
    transform: F,
) -> mpsc::Receiver<Job>
where
    F: Fn(DynamicImage) -> DynamicImage + Send + Sync + 'static,
{
    let (tx, rx) = stage_channel(config);
    let transform = Arc::new(transform);
    let stage = PipelineStage::new(name, input, tx);
    tokio::spawn(stage.run(move |job: Job| {
        let transform = Arc::clone(&transform);
        job.apply(name, move |image| Ok(transform(image)))
    }));
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::test_helpers::{gradient_image, write_fixture};
    use image::{ColorType, GenericImageView};

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    fn feed(jobs: Vec<Job>) -> mpsc::Receiver<Job> {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            for job in jobs {
                tx.send(job).await.unwrap();
            }
        });
        rx
    }

    #[tokio::test]
    async fn test_load_emits_one_job_per_path_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_fixture(dir.path(), "images/a.png", 20, 10);
        let missing = dir.path().join("images/missing.png");
        let c = write_fixture(dir.path(), "images/c.jpg", 8, 8);

        let mut rx = load(
            vec![a.clone(), missing.clone(), c.clone()],
            PathRewrite::default(),
            &config(),
        );

        let first = rx.recv().await.unwrap();
        assert_eq!(first.input_path(), a);
        assert_eq!(first.out_path(), dir.path().join("images/output/a.png"));
        assert_eq!(first.image().unwrap().dimensions(), (20, 10));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.input_path(), missing);
        assert!(matches!(second.error(), Some(PipelineError::FileNotFound(_))));

        let third = rx.recv().await.unwrap();
        assert_eq!(third.input_path(), c);
        assert!(!third.is_poisoned());

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_load_poisons_paths_without_segment() {
        let dir = tempfile::tempdir().unwrap();
        let stray = write_fixture(dir.path(), "photos/a.png", 4, 4);

        let mut rx = load(vec![stray], PathRewrite::default(), &config());
        let job = rx.recv().await.unwrap();
        assert!(matches!(job.error(), Some(PipelineError::OutputPath { .. })));
        assert!(job.out_path().as_os_str().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_load_poisons_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let latin1 = PathBuf::from(OsStr::from_bytes(b"images/caf\xe9.png"));
        let mut rx = load(vec![latin1.clone()], PathRewrite::default(), &config());
        let job = rx.recv().await.unwrap();
        assert_eq!(job.input_path(), latin1);
        assert!(matches!(job.error(), Some(PipelineError::NonUtf8Path(_))));
    }

    #[tokio::test]
    async fn test_resize_and_grayscale_stages() {
        let jobs = vec![Job::ready(
            "images/big.png".into(),
            "images/output/big.png".into(),
            gradient_image(1200, 600),
        )];

        let resized = resize(feed(jobs), BoundingBox::default(), &config());
        let mut gray = grayscale(resized, &config());

        let job = gray.recv().await.unwrap();
        let image = job.image().unwrap();
        assert_eq!(image.dimensions(), (500, 250));
        assert_eq!(image.color(), ColorType::L8);
        assert!(gray.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_transform_stages_forward_poisoned_jobs() {
        let jobs = vec![
            Job::poisoned(
                "images/bad.jpg".into(),
                "images/output/bad.jpg".into(),
                PipelineError::FileNotFound("images/bad.jpg".into()),
            ),
            Job::ready(
                "images/ok.png".into(),
                "images/output/ok.png".into(),
                gradient_image(30, 30),
            ),
        ];

        let mut out = grayscale(resize(feed(jobs), BoundingBox::default(), &config()), &config());

        let first = out.recv().await.unwrap();
        assert_eq!(first.input_path(), PathBuf::from("images/bad.jpg"));
        assert!(matches!(first.error(), Some(PipelineError::FileNotFound(_))));

        let second = out.recv().await.unwrap();
        assert_eq!(second.image().unwrap().color(), ColorType::L8);
    }

    #[tokio::test]
    async fn test_save_reports_every_job() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("images/output/nested/ok.png");
        let gif = dir.path().join("images/output/nope.gif");

        let jobs = vec![
            Job::ready(
                dir.path().join("images/nested/ok.png"),
                good.clone(),
                gradient_image(12, 12),
            ),
            Job::poisoned(
                dir.path().join("images/bad.jpg"),
                dir.path().join("images/output/bad.jpg"),
                PipelineError::FileNotFound(dir.path().join("images/bad.jpg")),
            ),
            Job::ready(
                dir.path().join("images/nope.gif"),
                gif.clone(),
                gradient_image(12, 12),
            ),
        ];

        let mut results = save(feed(jobs), 90, &config());
        let mut outcomes = Vec::new();
        while let Some(outcome) = results.recv().await {
            outcomes.push(outcome);
        }

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_success());
        assert!(good.exists());
        assert!(matches!(
            outcomes[1].error(),
            Some(PipelineError::FileNotFound(_))
        ));
        assert!(!dir.path().join("images/output/bad.jpg").exists());
        assert!(matches!(
            outcomes[2].error(),
            Some(PipelineError::UnsupportedFormat { .. })
        ));
        assert!(!gif.exists());
    }
}

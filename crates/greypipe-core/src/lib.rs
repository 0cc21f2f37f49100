//! greypipe core - resize and greyscale batches of images.
//!
//! Every image is decoded, shrunk to fit a bounding box, converted to
//! single-channel luma and written next to an `output` directory. Two
//! strategies are offered so their throughput can be compared:
//!
//! ```text
//! concurrent:  paths → Load → Resize → Grayscale → Save → outcomes
//!                     (one tokio task per stage, channels in between)
//! sequential:  for each path { load; resize; grayscale; save }
//! ```
//!
//! The concurrent run is fail-soft: a broken image is reported and the rest
//! still get processed. The sequential run stops at the first error.
//!
//! # Usage
//!
//! ```rust,ignore
//! use greypipe_core::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> greypipe_core::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = Pipeline::new(&config);
//!
//!     let report = pipeline
//!         .run_concurrent(vec!["images/cat.jpg".into()])
//!         .await
//!         .into_result()?;
//!     println!("{} image(s) written", report.succeeded());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod imaging;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, GreypipeError, PipelineError, PipelineResult, Result};
pub use imaging::{BoundingBox, EncodeFormat};
pub use pipeline::{BatchReport, Job, JobOutcome, JobState, OutcomeRecord, PathRewrite, Pipeline};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_pipeline_from_default_config() {
        let pipeline = Pipeline::new(&Config::default());
        let report = pipeline.run_concurrent(Vec::new()).await;
        assert!(report.into_result().is_ok());
    }
}

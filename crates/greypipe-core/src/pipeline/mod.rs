//! The staged image processing pipeline.
//!
//! This module contains the pieces of the concurrent pipeline and its
//! sequential counterpart:
//! - **job**: the unit of work and the input → output path rewrite
//! - **channel**: stage channels and the generic stage loop
//! - **stages**: load, resize, grayscale and save stages
//! - **report**: per-image outcomes and run summaries
//! - **runner**: wires the stages together; sequential reference run

pub mod channel;
pub mod job;
pub mod report;
pub mod runner;
pub mod stages;

// Re-exports for convenient access
pub use channel::PipelineStage;
pub use job::{Job, JobState, PathRewrite};
pub use report::{BatchReport, JobOutcome, OutcomeRecord};
pub use runner::Pipeline;

//! Multi-segment pipeline orchestration.
//!
//! [`Studio`] plans a run, drives a [`SegmentGenerator`](nexora_veo::SegmentGenerator)
//! one segment at a time, threads each segment's continuation token into the
//! next call and stores the finished [`VideoRecord`](nexora_core::VideoRecord)
//! in its [`Gallery`].

pub mod error;
pub mod events;
pub mod gallery;
pub mod orchestrator;
pub mod progress;

pub use error::{PipelineError, PipelineFailure, FAILURE_HEADLINE};
pub use events::PipelineEvent;
pub use gallery::Gallery;
pub use orchestrator::Studio;
pub use progress::{NoProgress, PipelineState, ProgressReporter};

//! Domain types and pure policies for the Nexora video pipeline.
//!
//! Nothing in this crate performs I/O. The generation client
//! (`nexora-veo`) and the orchestrator (`nexora-pipeline`) build on the
//! types and functions defined here.

pub mod artifact;
pub mod assistant;
pub mod error;
pub mod planner;
pub mod tier;
pub mod types;

pub use error::CoreError;
pub use planner::{plan, SegmentPlan};
pub use tier::{select_tier, EngineTier};
pub use types::{
    AspectRatio, ContinuationToken, GenerationConfig, GenerationRequest, ReferenceImage,
    Resolution, SegmentResult, VideoRecord,
};

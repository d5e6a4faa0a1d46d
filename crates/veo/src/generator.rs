//! The seam between the orchestrator and a generation backend.

use nexora_core::types::{GenerationConfig, SegmentResult};

use crate::error::GenerationError;

/// Produces one video segment per call.
///
/// Implementations may suspend for minutes while the remote job runs.
#[async_trait::async_trait]
pub trait SegmentGenerator: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Generate one segment.
    ///
    /// When `is_extension` is set the call continues
    /// `config.continuation_token`; otherwise it starts a new clip, seeded by
    /// `config.reference_image` when present.
    async fn generate_segment(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        is_extension: bool,
    ) -> Result<SegmentResult, GenerationError>;
}

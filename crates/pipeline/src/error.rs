use uuid::Uuid;

use nexora_core::CoreError;
use nexora_veo::GenerationError;

/// Headline shown to the user whenever a run aborts.
pub const FAILURE_HEADLINE: &str = "Multi-segment render failed.";

/// Why a run, or the preparation of one, failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidRequest(#[from] CoreError),

    #[error("Step {step} of {total_steps} failed: {source}")]
    Step {
        step: u32,
        total_steps: u32,
        #[source]
        source: GenerationError,
    },

    #[error("Video {0} not found in gallery")]
    RecordNotFound(Uuid),

    #[error("Video {0} has no continuation token and cannot be extended")]
    NotExtendable(Uuid),
}

/// Structured failure handed back to the caller of a run.
///
/// Pairs a fixed headline with the underlying error. Nothing from the
/// failed run is stored.
#[derive(Debug, thiserror::Error)]
#[error("{headline} {error}")]
pub struct PipelineFailure {
    pub headline: &'static str,
    #[source]
    pub error: PipelineError,
}

impl PipelineFailure {
    pub fn new(error: PipelineError) -> Self {
        Self {
            headline: FAILURE_HEADLINE,
            error,
        }
    }

    /// Message of the underlying error, without step framing.
    pub fn detail(&self) -> String {
        match &self.error {
            PipelineError::Step { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }

    /// Step that failed, if the run had started generating.
    pub fn failed_step(&self) -> Option<u32> {
        match &self.error {
            PipelineError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The generation error behind a step failure.
    pub fn generation_error(&self) -> Option<&GenerationError> {
        match &self.error {
            PipelineError::Step { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<PipelineError> for PipelineFailure {
    fn from(error: PipelineError) -> Self {
        Self::new(error)
    }
}

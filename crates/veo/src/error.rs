//! Failure modes of a single segment generation.

use crate::api::VeoApiError;

/// Errors returned by [`SegmentGenerator`](crate::SegmentGenerator).
///
/// None of these are retried; the orchestrator aborts the run on the first
/// one it sees.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Submission or status query failed, or the job itself reported an error.
    #[error("Remote job failed: {0}")]
    RemoteJob(String),

    /// The job completed without a retrievable artifact.
    #[error("No video URI returned by operation {operation}")]
    NoArtifact { operation: String },

    /// Fetching the artifact did not succeed.
    #[error("Artifact retrieval failed: {detail}")]
    Retrieval { status: Option<u16>, detail: String },

    /// The job was still running after the poll budget ran out.
    #[error("Operation {operation} still running after {polls} status checks")]
    Timeout { operation: String, polls: u32 },

    /// The request cannot be sent as given.
    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),

    /// Polling was cancelled by the caller.
    #[error("Generation cancelled while waiting for operation {operation}")]
    Cancelled { operation: String },
}

impl From<VeoApiError> for GenerationError {
    fn from(err: VeoApiError) -> Self {
        Self::RemoteJob(err.to_string())
    }
}

impl GenerationError {
    /// Build a [`GenerationError::Retrieval`] from a download failure.
    pub fn retrieval(err: VeoApiError) -> Self {
        let status = err.status();
        let detail = match status {
            Some(code) => format!("HTTP error status {code}"),
            None => err.to_string(),
        };
        Self::Retrieval { status, detail }
    }
}

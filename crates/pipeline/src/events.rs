//! Events broadcast by the orchestrator while a run progresses.

use serde::Serialize;
use uuid::Uuid;

/// A state change of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PipelineEvent {
    /// A run was planned and is about to start.
    RunStarted {
        run_id: Uuid,
        total_steps: u32,
        is_extension_of_existing: bool,
    },

    /// Segment generation for `step` is about to begin.
    StepStarted {
        run_id: Uuid,
        step: u32,
        total_steps: u32,
        is_extension: bool,
    },

    /// Segment `step` finished and its artifact was downloaded.
    StepCompleted {
        run_id: Uuid,
        step: u32,
        total_steps: u32,
        artifact_bytes: usize,
    },

    /// The run finished and its record was stored in the gallery.
    Completed { run_id: Uuid, record_id: Uuid },

    /// The run aborted. No record was stored.
    Failed {
        run_id: Uuid,
        /// Step that failed, if the run got that far.
        step: Option<u32>,
        /// Human-readable error description.
        error: String,
    },
}

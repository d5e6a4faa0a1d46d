//! Progress reporting and the per-run rolling state.

use nexora_core::types::{ContinuationToken, GenerationConfig, SegmentResult};

/// Receives `(current_step, total_steps)` before each segment starts.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, current_step: u32, total_steps: u32);
}

impl<F> ProgressReporter for F
where
    F: Fn(u32, u32) + Send + Sync,
{
    fn report(&self, current_step: u32, total_steps: u32) {
        self(current_step, total_steps)
    }
}

/// Reporter that ignores progress.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _current_step: u32, _total_steps: u32) {}
}

/// Rolling state of one run, owned by the orchestrator for its duration.
///
/// Keeps `1 <= current_step <= total_steps`. Every recorded segment
/// overwrites the previous artifact and token.
#[derive(Debug)]
pub struct PipelineState {
    current_step: u32,
    total_steps: u32,
    last_artifact: Option<Vec<u8>>,
    last_continuation_token: Option<ContinuationToken>,
}

impl PipelineState {
    pub fn new(total_steps: u32) -> Self {
        Self {
            current_step: 1,
            total_steps: total_steps.max(1),
            last_artifact: None,
            last_continuation_token: None,
        }
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// Move to the next step. Returns `false` if already on the last one.
    pub fn advance(&mut self) -> bool {
        if self.current_step >= self.total_steps {
            return false;
        }
        self.current_step += 1;
        true
    }

    /// Store the output of the current step.
    pub fn record(&mut self, segment: SegmentResult) {
        self.last_artifact = Some(segment.artifact_bytes);
        self.last_continuation_token = Some(segment.continuation_token);
    }

    pub fn last_continuation_token(&self) -> Option<&ContinuationToken> {
        self.last_continuation_token.as_ref()
    }

    /// Config for the current step.
    ///
    /// Before any segment exists this is the caller's config; afterwards it
    /// is the extension config continuing the latest segment.
    pub fn step_config(&self, base: &GenerationConfig) -> GenerationConfig {
        match &self.last_continuation_token {
            Some(token) => base.for_extension_step(token.clone()),
            None => base.clone(),
        }
    }

    /// Consume the state, yielding the latest artifact and token.
    pub fn finish(self) -> (Vec<u8>, Option<ContinuationToken>) {
        (
            self.last_artifact.unwrap_or_default(),
            self.last_continuation_token,
        )
    }
}

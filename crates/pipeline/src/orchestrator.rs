//! The pipeline orchestrator.
//!
//! A run moves `Idle -> Running(step) -> Completed | Failed`. Steps execute
//! strictly in sequence because every extension consumes the token of the
//! segment before it. The first failing step aborts the run.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::Instrument;
use uuid::Uuid;

use nexora_core::planner::{self, SegmentPlan};
use nexora_core::tier::EngineTier;
use nexora_core::types::{GenerationConfig, GenerationRequest, VideoRecord};
use nexora_veo::SegmentGenerator;

use crate::error::{PipelineError, PipelineFailure};
use crate::events::PipelineEvent;
use crate::gallery::Gallery;
use crate::progress::{PipelineState, ProgressReporter};

/// Broadcast channel capacity for pipeline events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Entry point for producing clips.
///
/// Runs on one `Studio` are serialised: a second call waits until the
/// first has finished, so two runs never submit jobs at the same time.
pub struct Studio {
    generator: Arc<dyn SegmentGenerator>,
    gallery: Arc<Gallery>,
    event_tx: broadcast::Sender<PipelineEvent>,
    run_lock: Mutex<()>,
}

impl Studio {
    pub fn new(generator: Arc<dyn SegmentGenerator>) -> Self {
        Self::with_gallery(generator, Arc::new(Gallery::new()))
    }

    /// Create a studio that stores records in an existing gallery.
    pub fn with_gallery(generator: Arc<dyn SegmentGenerator>, gallery: Arc<Gallery>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            generator,
            gallery,
            event_tx,
            run_lock: Mutex::new(()),
        }
    }

    pub fn gallery(&self) -> &Arc<Gallery> {
        &self.gallery
    }

    /// Subscribe to events of every subsequent run.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.event_tx.subscribe()
    }

    /// Produce a clip for `request`.
    ///
    /// `progress` is called with `(current_step, total_steps)` before each
    /// segment starts. On success the record is stored in the gallery and
    /// returned; on failure nothing is stored.
    pub async fn run_pipeline(
        &self,
        request: GenerationRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<VideoRecord, PipelineFailure> {
        let _guard = self.run_lock.lock().await;
        let run_id = Uuid::new_v4();

        if let Err(e) = request.config.validate() {
            tracing::warn!(%run_id, error = %e, "Rejected pipeline request");
            self.publish(PipelineEvent::Failed {
                run_id,
                step: None,
                error: e.to_string(),
            });
            return Err(PipelineError::from(e).into());
        }

        let plan = planner::plan(
            i64::from(request.config.target_duration_secs),
            request.config.is_extension_of_existing(),
        );

        let span = tracing::info_span!(
            "pipeline",
            %run_id,
            generator = self.generator.name(),
            total_steps = plan.total_steps,
        );

        self.execute(run_id, &request, plan, progress)
            .instrument(span)
            .await
    }

    /// Build an extension request continuing a gallery record.
    ///
    /// Extensions always use the quality tier and keep the record's aspect
    /// ratio.
    pub async fn extend_request(
        &self,
        record_id: Uuid,
        prompt: impl Into<String>,
        target_duration_secs: u32,
    ) -> Result<GenerationRequest, PipelineError> {
        let record = self
            .gallery
            .get(record_id)
            .await
            .ok_or(PipelineError::RecordNotFound(record_id))?;
        let token = record
            .continuation_token
            .ok_or(PipelineError::NotExtendable(record_id))?;

        let config = GenerationConfig::default()
            .with_tier(EngineTier::Quality)
            .with_aspect_ratio(record.aspect_ratio)
            .with_target_duration(target_duration_secs)
            .with_continuation_token(token);

        Ok(GenerationRequest::new(prompt, config))
    }

    /// Build a fresh request prefilled from a gallery record.
    pub async fn remix_request(&self, record_id: Uuid) -> Result<GenerationRequest, PipelineError> {
        let record = self
            .gallery
            .get(record_id)
            .await
            .ok_or(PipelineError::RecordNotFound(record_id))?;

        let config = GenerationConfig::default().with_aspect_ratio(record.aspect_ratio);
        Ok(GenerationRequest::new(record.description, config))
    }

    // ---- private helpers ----

    async fn execute(
        &self,
        run_id: Uuid,
        request: &GenerationRequest,
        plan: SegmentPlan,
        progress: &dyn ProgressReporter,
    ) -> Result<VideoRecord, PipelineFailure> {
        let total_steps = plan.total_steps;
        let mut state = PipelineState::new(total_steps);

        tracing::info!(
            is_extension_of_existing = plan.is_first_step_extension,
            target_secs = request.config.target_duration_secs,
            "Pipeline started",
        );
        self.publish(PipelineEvent::RunStarted {
            run_id,
            total_steps,
            is_extension_of_existing: plan.is_first_step_extension,
        });

        loop {
            let step = state.current_step();
            let is_extension = plan.is_extension_step(step);
            let config = state.step_config(&request.config);

            progress.report(step, total_steps);
            self.publish(PipelineEvent::StepStarted {
                run_id,
                step,
                total_steps,
                is_extension,
            });
            tracing::info!(step, total_steps, is_extension, "Generating segment");

            let segment = match self
                .generator
                .generate_segment(&request.prompt, &config, is_extension)
                .await
            {
                Ok(segment) => segment,
                Err(source) => {
                    tracing::error!(step, total_steps, error = %source, "Segment failed, aborting run");
                    self.publish(PipelineEvent::Failed {
                        run_id,
                        step: Some(step),
                        error: source.to_string(),
                    });
                    return Err(PipelineError::Step {
                        step,
                        total_steps,
                        source,
                    }
                    .into());
                }
            };

            self.publish(PipelineEvent::StepCompleted {
                run_id,
                step,
                total_steps,
                artifact_bytes: segment.artifact_bytes.len(),
            });
            state.record(segment);

            if !state.advance() {
                break;
            }
        }

        let (artifact, token) = state.finish();
        let record =
            VideoRecord::from_final_segment(&request.prompt, &request.config, &artifact, token);

        self.gallery.insert(record.clone()).await;
        self.publish(PipelineEvent::Completed {
            run_id,
            record_id: record.id,
        });
        tracing::info!(record_id = %record.id, title = %record.title, "Pipeline completed");

        Ok(record)
    }

    fn publish(&self, event: PipelineEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }
}

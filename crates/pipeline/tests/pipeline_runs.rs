//! Integration tests for [`Studio::run_pipeline`] using a scripted
//! segment generator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;

use nexora_core::tier::EngineTier;
use nexora_core::types::{
    AspectRatio, ContinuationToken, GenerationConfig, GenerationRequest, ReferenceImage,
    Resolution, SegmentResult,
};
use nexora_pipeline::{NoProgress, PipelineError, PipelineEvent, Studio, FAILURE_HEADLINE};
use nexora_veo::{GenerationError, SegmentGenerator};

// ---------------------------------------------------------------------------
// Scripted generator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Call {
    prompt: String,
    config: GenerationConfig,
    is_extension: bool,
}

#[derive(Default)]
struct ScriptedGenerator {
    calls: Mutex<Vec<Call>>,
    /// 1-based call number that fails with `NoArtifact`.
    fail_on_call: Option<usize>,
}

impl ScriptedGenerator {
    fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

fn token(n: usize) -> ContinuationToken {
    ContinuationToken::new(json!({ "uri": format!("files/seg-{n}") }))
}

#[async_trait::async_trait]
impl SegmentGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_segment(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        is_extension: bool,
    ) -> Result<SegmentResult, GenerationError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call {
                prompt: prompt.to_string(),
                config: config.clone(),
                is_extension,
            });
            calls.len()
        };

        if self.fail_on_call == Some(n) {
            return Err(GenerationError::NoArtifact {
                operation: format!("operations/{n}"),
            });
        }

        Ok(SegmentResult {
            artifact_bytes: format!("segment-{n}").into_bytes(),
            continuation_token: token(n),
        })
    }
}

fn progress_log() -> (Arc<Mutex<Vec<(u32, u32)>>>, impl Fn(u32, u32) + Send + Sync) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    (log, move |c: u32, t: u32| sink.lock().unwrap().push((c, t)))
}

fn studio(generator: &Arc<ScriptedGenerator>) -> Studio {
    Studio::new(Arc::clone(generator) as Arc<dyn SegmentGenerator>)
}

// ---------------------------------------------------------------------------
// Multi-segment runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sunset_drive_runs_three_sequential_segments() {
    let generator = Arc::new(ScriptedGenerator::default());
    let studio = studio(&generator);
    let (progress, reporter) = progress_log();

    let config = GenerationConfig::default()
        .with_target_duration(22)
        .with_aspect_ratio(AspectRatio::Landscape)
        .with_resolution(Resolution::Hd720)
        .with_tier(EngineTier::Fast);

    let record = studio
        .run_pipeline(GenerationRequest::new("sunset drive", config), &reporter)
        .await
        .unwrap();

    let calls = generator.calls();
    assert_eq!(calls.len(), 3);
    assert!(!calls[0].is_extension);
    assert!(calls[1].is_extension);
    assert!(calls[2].is_extension);
    assert!(calls.iter().all(|c| c.prompt == "sunset drive"));

    assert_eq!(*progress.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);

    assert_eq!(record.description, "sunset drive");
    assert_eq!(record.title, "Cinematic Short");
    assert_eq!(record.duration_label, "22s");
    assert_eq!(record.aspect_ratio, AspectRatio::Landscape);
}

#[tokio::test]
async fn each_extension_continues_the_previous_segment() {
    let generator = Arc::new(ScriptedGenerator::default());
    let studio = studio(&generator);

    let config = GenerationConfig::default().with_target_duration(30);
    studio
        .run_pipeline(GenerationRequest::new("river", config), &|_: u32, _: u32| {})
        .await
        .unwrap();

    let calls = generator.calls();
    assert_eq!(calls.len(), 5);
    assert!(calls[0].config.continuation_token.is_none());
    for (i, call) in calls.iter().enumerate().skip(1) {
        assert_eq!(call.config.continuation_token, Some(token(i)), "call {}", i + 1);
    }
}

#[tokio::test]
async fn extension_steps_use_pinned_resolution() {
    let generator = Arc::new(ScriptedGenerator::default());
    let studio = studio(&generator);

    let config = GenerationConfig::default()
        .with_resolution(Resolution::Hd1080)
        .with_target_duration(15);
    studio
        .run_pipeline(GenerationRequest::new("glacier", config), &|_: u32, _: u32| {})
        .await
        .unwrap();

    let calls = generator.calls();
    assert_eq!(calls[0].config.resolution, Resolution::Hd1080);
    assert_eq!(calls[1].config.resolution, Resolution::Hd720);
}

#[tokio::test]
async fn reference_image_forces_quality_tier() {
    let generator = Arc::new(ScriptedGenerator::default());
    let studio = studio(&generator);

    let config = GenerationConfig::default()
        .with_tier(EngineTier::Fast)
        .with_reference_image(ReferenceImage::png(b"still".to_vec()))
        .with_target_duration(15);
    studio
        .run_pipeline(GenerationRequest::new("portrait", config), &|_: u32, _: u32| {})
        .await
        .unwrap();

    let calls = generator.calls();
    assert!(!calls[0].is_extension);
    assert!(calls[0].config.reference_image.is_some());
    assert_eq!(calls[0].config.effective_tier(), EngineTier::Quality);
    assert!(calls[1].config.reference_image.is_none());
    assert_eq!(calls[1].config.effective_tier(), EngineTier::Quality);
}

#[tokio::test]
async fn record_keeps_only_the_latest_segment() {
    let generator = Arc::new(ScriptedGenerator::default());
    let studio = studio(&generator);

    let config = GenerationConfig::default().with_target_duration(60);
    let record = studio
        .run_pipeline(GenerationRequest::new("desert", config), &|_: u32, _: u32| {})
        .await
        .unwrap();

    assert_eq!(generator.calls().len(), 9);
    assert_eq!(record.title, "Long Feature");
    assert_eq!(record.artifact_bytes().unwrap(), b"segment-9");
    assert_eq!(record.continuation_token, Some(token(9)));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failure_on_step_two_aborts_the_run() {
    let generator = Arc::new(ScriptedGenerator::failing_on(2));
    let studio = studio(&generator);
    let (progress, reporter) = progress_log();

    let config = GenerationConfig::default().with_target_duration(22);
    let failure = studio
        .run_pipeline(GenerationRequest::new("storm", config), &reporter)
        .await
        .unwrap_err();

    assert_eq!(generator.calls().len(), 2);
    assert_eq!(*progress.lock().unwrap(), vec![(1, 3), (2, 3)]);
    assert_eq!(failure.headline, FAILURE_HEADLINE);
    assert_eq!(failure.failed_step(), Some(2));
    assert_matches!(
        failure.generation_error(),
        Some(GenerationError::NoArtifact { .. })
    );
    assert!(studio.gallery().is_empty().await);
}

#[tokio::test]
async fn invalid_target_is_rejected_before_any_call() {
    let generator = Arc::new(ScriptedGenerator::default());
    let studio = studio(&generator);

    let config = GenerationConfig::default().with_target_duration(0);
    let failure = studio
        .run_pipeline(GenerationRequest::new("nothing", config), &|_: u32, _: u32| {})
        .await
        .unwrap_err();

    assert_matches!(failure.error, PipelineError::InvalidRequest(_));
    assert!(generator.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Gallery round-trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn record_token_seeds_a_single_step_extension() {
    let generator = Arc::new(ScriptedGenerator::default());
    let studio = studio(&generator);

    let base = studio
        .run_pipeline(
            GenerationRequest::new("harbor", GenerationConfig::default()),
            &|_: u32, _: u32| {},
        )
        .await
        .unwrap();
    assert_eq!(generator.calls().len(), 1);

    let request = studio
        .extend_request(base.id, base.description.clone(), 15)
        .await
        .unwrap();
    assert_eq!(request.config.engine_tier, EngineTier::Quality);

    let (progress, reporter) = progress_log();
    let extended = studio.run_pipeline(request, &reporter).await.unwrap();

    let calls = generator.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].is_extension);
    assert_eq!(calls[1].config.continuation_token, base.continuation_token);
    assert_eq!(*progress.lock().unwrap(), vec![(1, 1)]);
    assert_eq!(extended.continuation_token, Some(token(2)));

    let gallery = studio.gallery().list().await;
    assert_eq!(gallery.len(), 2);
    assert_eq!(gallery[0].id, extended.id);
}

#[tokio::test]
async fn multi_step_extension_chains_from_the_seed_token() {
    let generator = Arc::new(ScriptedGenerator::default());
    let studio = studio(&generator);
    let (progress, reporter) = progress_log();
    let seed = ContinuationToken::new(json!({ "uri": "files/seed" }));

    let config = GenerationConfig::default()
        .with_target_duration(30)
        .with_continuation_token(seed.clone());
    let record = studio
        .run_pipeline(GenerationRequest::new("canyon", config), &reporter)
        .await
        .unwrap();

    let calls = generator.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|c| c.is_extension));
    assert_eq!(calls[0].config.continuation_token, Some(seed));
    for (i, call) in calls.iter().enumerate().skip(1) {
        assert_eq!(call.config.continuation_token, Some(token(i)), "call {}", i + 1);
    }
    assert_eq!(
        *progress.lock().unwrap(),
        vec![(1, 4), (2, 4), (3, 4), (4, 4)]
    );
    assert_eq!(record.continuation_token, Some(token(4)));
}

#[tokio::test]
async fn extend_unknown_record_fails() {
    let generator = Arc::new(ScriptedGenerator::default());
    let studio = studio(&generator);
    let id = uuid::Uuid::new_v4();

    assert_matches!(
        studio.extend_request(id, "x", 15).await,
        Err(PipelineError::RecordNotFound(missing)) if missing == id
    );
}

#[tokio::test]
async fn remix_prefills_prompt_and_aspect_ratio() {
    let generator = Arc::new(ScriptedGenerator::default());
    let studio = studio(&generator);

    let config = GenerationConfig::default().with_aspect_ratio(AspectRatio::Portrait);
    let record = studio
        .run_pipeline(GenerationRequest::new("skater", config), &|_: u32, _: u32| {})
        .await
        .unwrap();

    let request = studio.remix_request(record.id).await.unwrap();
    assert_eq!(request.prompt, "skater");
    assert_eq!(request.config.aspect_ratio, AspectRatio::Portrait);
    assert!(request.config.continuation_token.is_none());
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn events_follow_run_lifecycle() {
    let generator = Arc::new(ScriptedGenerator::default());
    let studio = studio(&generator);
    let mut rx = studio.subscribe();

    let config = GenerationConfig::default().with_target_duration(15);
    let record = studio
        .run_pipeline(GenerationRequest::new("comet", config), &|_: u32, _: u32| {})
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert_eq!(events.len(), 6);
    assert_matches!(events[0], PipelineEvent::RunStarted { total_steps: 2, .. });
    assert_matches!(events[1], PipelineEvent::StepStarted { step: 1, is_extension: false, .. });
    assert_matches!(events[2], PipelineEvent::StepCompleted { step: 1, .. });
    assert_matches!(events[3], PipelineEvent::StepStarted { step: 2, is_extension: true, .. });
    assert_matches!(events[4], PipelineEvent::StepCompleted { step: 2, .. });
    assert_matches!(events[5], PipelineEvent::Completed { record_id, .. } if record_id == record.id);
}

// ---------------------------------------------------------------------------
// Run serialisation
// ---------------------------------------------------------------------------

/// Generator that sleeps per call and tracks how many calls overlap.
#[derive(Default)]
struct SlowGenerator {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[async_trait::async_trait]
impl SegmentGenerator for SlowGenerator {
    fn name(&self) -> &str {
        "slow"
    }

    async fn generate_segment(
        &self,
        _prompt: &str,
        _config: &GenerationConfig,
        _is_extension: bool,
    ) -> Result<SegmentResult, GenerationError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(20)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(SegmentResult {
            artifact_bytes: format!("segment-{n}").into_bytes(),
            continuation_token: token(n),
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_runs_never_overlap() {
    let generator = Arc::new(SlowGenerator::default());
    let studio = Arc::new(Studio::new(
        Arc::clone(&generator) as Arc<dyn SegmentGenerator>
    ));

    let handles: Vec<_> = ["first", "second"]
        .into_iter()
        .map(|prompt| {
            let studio = Arc::clone(&studio);
            tokio::spawn(async move {
                let config = GenerationConfig::default().with_target_duration(22);
                studio
                    .run_pipeline(GenerationRequest::new(prompt, config), &NoProgress)
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(generator.calls.load(Ordering::SeqCst), 6);
    assert_eq!(generator.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(studio.gallery().len().await, 2);
}

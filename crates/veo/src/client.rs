//! [`SegmentGenerator`] backed by the remote generation API.
//!
//! One call walks a segment through its whole life: tier selection,
//! payload construction, submission, bounded polling, artifact download.

use nexora_core::types::{ContinuationToken, GenerationConfig, SegmentResult};
use tokio_util::sync::CancellationToken;

use crate::api::VeoApi;
use crate::config::VeoConfig;
use crate::error::GenerationError;
use crate::generator::SegmentGenerator;
use crate::messages::build_predict_request;
use crate::poll::poll_until_done;

/// Generation client for one API endpoint.
pub struct VeoClient {
    api: VeoApi,
    config: VeoConfig,
    cancel: CancellationToken,
}

impl VeoClient {
    pub fn new(config: VeoConfig) -> Self {
        let api = VeoApi::new(config.api_url.clone(), config.api_key.clone());
        Self {
            api,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `cancel` to abort in-flight polling from outside.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that aborts polling when cancelled.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn config(&self) -> &VeoConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl SegmentGenerator for VeoClient {
    fn name(&self) -> &str {
        "veo"
    }

    async fn generate_segment(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        is_extension: bool,
    ) -> Result<SegmentResult, GenerationError> {
        if is_extension && config.continuation_token.is_none() {
            return Err(GenerationError::InvalidRequest(
                "extension step has no continuation token".to_string(),
            ));
        }

        let tier = config.effective_tier();
        let model = self.config.model_for(tier);
        let request = build_predict_request(prompt, config, is_extension);

        let submitted = self.api.submit(model, &request).await?;
        tracing::info!(
            model,
            tier = %tier,
            is_extension,
            operation = %submitted.name,
            "Generation job submitted",
        );

        let api = &self.api;
        let operation = poll_until_done(submitted, &self.config.poll, &self.cancel, |name| async move {
            api.get_operation(&name).await
        })
        .await?;

        if let Some(err) = &operation.error {
            tracing::error!(
                operation = %operation.name,
                code = ?err.code,
                message = %err.message,
                "Generation job failed",
            );
            return Err(GenerationError::RemoteJob(err.message.clone()));
        }

        let uri = operation
            .video_uri()
            .ok_or_else(|| GenerationError::NoArtifact {
                operation: operation.name.clone(),
            })?
            .to_string();
        let video = operation
            .generated_video()
            .cloned()
            .ok_or_else(|| GenerationError::NoArtifact {
                operation: operation.name.clone(),
            })?;

        let artifact_bytes = self
            .api
            .download(&uri)
            .await
            .map_err(GenerationError::retrieval)?;

        tracing::info!(
            operation = %operation.name,
            bytes = artifact_bytes.len(),
            "Generation job completed",
        );

        Ok(SegmentResult {
            artifact_bytes,
            continuation_token: ContinuationToken::new(video),
        })
    }
}

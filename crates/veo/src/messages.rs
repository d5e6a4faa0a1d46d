//! Wire types for the long-running video generation API.
//!
//! A generation is submitted as a `predictLongRunning` request and tracked
//! through an [`Operation`] until `done` is set. The completed operation
//! carries the generated video object, whose `uri` locates the artifact.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use nexora_core::types::{effective_prompt, GenerationConfig, EXTENSION_RESOLUTION};

/// Videos requested per call. The pipeline always consumes exactly one.
pub const SAMPLE_COUNT: u32 = 1;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body of `POST /models/{model}:predictLongRunning`.
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<PredictInstance>,
    pub parameters: PredictParameters,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictInstance {
    pub prompt: String,
    /// Reference image, only on non-extension calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<InlineImage>,
    /// Previous segment's video object, only on extension calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictParameters {
    pub aspect_ratio: String,
    pub resolution: String,
    pub sample_count: u32,
}

impl PredictRequest {
    pub fn instance(&self) -> Option<&PredictInstance> {
        self.instances.first()
    }
}

/// Build the request body for one segment.
///
/// Extension calls are pinned to [`EXTENSION_RESOLUTION`] and carry the
/// continuation token; fresh calls carry the reference image. The two
/// attachments never appear together.
pub fn build_predict_request(
    prompt: &str,
    config: &GenerationConfig,
    is_extension: bool,
) -> PredictRequest {
    let resolution = if is_extension {
        EXTENSION_RESOLUTION
    } else {
        config.resolution
    };

    let (image, video) = if is_extension {
        let video = config
            .continuation_token
            .as_ref()
            .map(|t| t.as_value().clone());
        (None, video)
    } else {
        let image = config.reference_image.as_ref().map(|img| InlineImage {
            bytes_base64_encoded: STANDARD.encode(&img.bytes),
            mime_type: img.mime_type.clone(),
        });
        (image, None)
    };

    PredictRequest {
        instances: vec![PredictInstance {
            prompt: effective_prompt(prompt).to_string(),
            image,
            video,
        }],
        parameters: PredictParameters {
            aspect_ratio: config.aspect_ratio.as_str().to_string(),
            resolution: resolution.as_str().to_string(),
            sample_count: SAMPLE_COUNT,
        },
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// A long-running job handle as returned by submit and status calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: Option<OperationResponse>,
    #[serde(default)]
    pub error: Option<OperationError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<serde_json::Value>,
}

/// Error status attached to a finished operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: String,
}

impl Operation {
    /// Video object of the first generated sample.
    pub fn generated_video(&self) -> Option<&serde_json::Value> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .first()?
            .video
            .as_ref()
    }

    /// Download locator of the first generated sample.
    pub fn video_uri(&self) -> Option<&str> {
        self.generated_video()?
            .get("uri")?
            .as_str()
            .filter(|uri| !uri.is_empty())
    }
}

//! Request, segment and record types shared by every crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artifact::{self, DEFAULT_IMAGE_MIME, VIDEO_MIME};
use crate::error::CoreError;
use crate::tier::{select_tier, EngineTier};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prompt sent when the caller leaves the prompt blank.
pub const FALLBACK_PROMPT: &str = "Cinematic visual sequence";

/// Resolution every extension call is pinned to.
pub const EXTENSION_RESOLUTION: Resolution = Resolution::Hd720;

/// Targets at or above this many seconds are labelled long-form.
pub const LONG_FORM_THRESHOLD_SECS: u32 = 60;

/// Longest target duration the studio offers (10 minutes).
pub const MAX_TARGET_DURATION_SECS: u32 = 600;

/// Default target duration of a new project.
pub const DEFAULT_TARGET_DURATION_SECS: u32 = 8;

pub const TITLE_LONG_FEATURE: &str = "Long Feature";
pub const TITLE_CINEMATIC_SHORT: &str = "Cinematic Short";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "16:9" => Ok(Self::Landscape),
            "9:16" => Ok(Self::Portrait),
            _ => Err(CoreError::Validation(format!(
                "Invalid aspect ratio '{s}'. Must be one of: 16:9, 9:16"
            ))),
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Hd1080,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hd720 => "720p",
            Self::Hd1080 => "1080p",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "720p" => Ok(Self::Hd720),
            "1080p" => Ok(Self::Hd1080),
            _ => Err(CoreError::Validation(format!(
                "Invalid resolution '{s}'. Must be one of: 720p, 1080p"
            ))),
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// Still image used to seed the first segment of a fresh run.
#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ReferenceImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn png(bytes: Vec<u8>) -> Self {
        Self::new(bytes, DEFAULT_IMAGE_MIME)
    }
}

impl std::fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Opaque handle to a produced segment, echoed back to continue it.
///
/// The value is whatever video object the remote API returned; it is never
/// inspected, only passed by value to the next extension request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(serde_json::Value);

impl ContinuationToken {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Configuration & request
// ---------------------------------------------------------------------------

/// Caller-selected generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub engine_tier: EngineTier,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub target_duration_secs: u32,
    /// Only used by the first segment of a fresh run.
    pub reference_image: Option<ReferenceImage>,
    /// Present when the run continues an existing clip.
    pub continuation_token: Option<ContinuationToken>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            engine_tier: EngineTier::Fast,
            aspect_ratio: AspectRatio::Landscape,
            resolution: Resolution::Hd720,
            target_duration_secs: DEFAULT_TARGET_DURATION_SECS,
            reference_image: None,
            continuation_token: None,
        }
    }
}

impl GenerationConfig {
    pub fn with_tier(mut self, tier: EngineTier) -> Self {
        self.engine_tier = tier;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_target_duration(mut self, secs: u32) -> Self {
        self.target_duration_secs = secs;
        self
    }

    pub fn with_reference_image(mut self, image: ReferenceImage) -> Self {
        self.reference_image = Some(image);
        self
    }

    pub fn with_continuation_token(mut self, token: ContinuationToken) -> Self {
        self.continuation_token = Some(token);
        self
    }

    /// Whether this run continues a previously generated clip.
    pub fn is_extension_of_existing(&self) -> bool {
        self.continuation_token.is_some()
    }

    /// Tier that will actually serve a request built from this config.
    pub fn effective_tier(&self) -> EngineTier {
        select_tier(
            self.engine_tier,
            self.reference_image.is_some(),
            self.continuation_token.is_some(),
        )
    }

    /// Derive the config for the extension step that follows a segment.
    ///
    /// Resolution is pinned, the reference image is dropped and the
    /// continuation source is replaced by `token`.
    pub fn for_extension_step(&self, token: ContinuationToken) -> Self {
        Self {
            resolution: EXTENSION_RESOLUTION,
            reference_image: None,
            continuation_token: Some(token),
            ..self.clone()
        }
    }

    /// Validate the target duration.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.target_duration_secs == 0 {
            return Err(CoreError::Validation(
                "target_duration_secs must be positive".to_string(),
            ));
        }
        if self.target_duration_secs > MAX_TARGET_DURATION_SECS {
            return Err(CoreError::Validation(format!(
                "target_duration_secs must not exceed {MAX_TARGET_DURATION_SECS} (got {})",
                self.target_duration_secs
            )));
        }
        Ok(())
    }
}

/// A prompt plus the configuration to render it with.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub config: GenerationConfig,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, config: GenerationConfig) -> Self {
        Self {
            prompt: prompt.into(),
            config,
        }
    }
}

/// Prompt actually sent to the API: `prompt` trimmed, or the fallback text.
pub fn effective_prompt(prompt: &str) -> &str {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        FALLBACK_PROMPT
    } else {
        trimmed
    }
}

// ---------------------------------------------------------------------------
// Segment & record
// ---------------------------------------------------------------------------

/// Output of one completed generation job.
#[derive(Clone, PartialEq)]
pub struct SegmentResult {
    pub artifact_bytes: Vec<u8>,
    pub continuation_token: ContinuationToken,
}

impl std::fmt::Debug for SegmentResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentResult")
            .field("artifact_len", &self.artifact_bytes.len())
            .field("continuation_token", &self.continuation_token)
            .finish()
    }
}

/// A finished clip as stored in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: Uuid,
    pub title: String,
    /// The prompt the clip was generated from.
    pub description: String,
    /// Human-readable target duration, e.g. `"22s"`.
    pub duration_label: String,
    pub aspect_ratio: AspectRatio,
    /// `data:video/mp4;base64,...` reference to the final artifact.
    pub artifact_url: String,
    /// Token of the last segment, used to extend this clip later.
    pub continuation_token: Option<ContinuationToken>,
    pub created_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Assemble a record from the last segment of a successful run.
    pub fn from_final_segment(
        prompt: &str,
        config: &GenerationConfig,
        artifact_bytes: &[u8],
        continuation_token: Option<ContinuationToken>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title_for_duration(config.target_duration_secs).to_string(),
            description: prompt.to_string(),
            duration_label: format!("{}s", config.target_duration_secs),
            aspect_ratio: config.aspect_ratio,
            artifact_url: artifact::encode_data_url(VIDEO_MIME, artifact_bytes),
            continuation_token,
            created_at: Utc::now(),
        }
    }

    /// Decode the inline artifact back into raw bytes.
    pub fn artifact_bytes(&self) -> Result<Vec<u8>, CoreError> {
        artifact::decode_data_url(&self.artifact_url).map(|(_, bytes)| bytes)
    }
}

/// Gallery title for a clip of the given target duration.
pub fn title_for_duration(target_duration_secs: u32) -> &'static str {
    if target_duration_secs >= LONG_FORM_THRESHOLD_SECS {
        TITLE_LONG_FEATURE
    } else {
        TITLE_CINEMATIC_SHORT
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Processing tier selection.
//!
//! The fast tier cannot accept a reference image or continue an existing
//! clip. [`select_tier`] is the single place where that rule lives; the
//! generation client must route every request through it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default remote model for the fast tier.
pub const FAST_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Default remote model for the quality tier.
pub const QUALITY_MODEL: &str = "veo-3.1-generate-preview";

pub const TIER_FAST: &str = "fast";
pub const TIER_QUALITY: &str = "quality";

/// Processing profile used for one generation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineTier {
    #[default]
    Fast,
    Quality,
}

impl EngineTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => TIER_FAST,
            Self::Quality => TIER_QUALITY,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            TIER_FAST => Ok(Self::Fast),
            TIER_QUALITY => Ok(Self::Quality),
            _ => Err(CoreError::Validation(format!(
                "Invalid engine tier '{s}'. Must be one of: {TIER_FAST}, {TIER_QUALITY}"
            ))),
        }
    }

    /// Built-in model identifier for this tier.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Fast => FAST_MODEL,
            Self::Quality => QUALITY_MODEL,
        }
    }
}

impl std::fmt::Display for EngineTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the tier that will actually serve a request.
///
/// Quality is used when it is requested, when a reference image is
/// attached, or when the request continues a previous segment.
pub fn select_tier(
    requested: EngineTier,
    has_reference_image: bool,
    has_continuation_token: bool,
) -> EngineTier {
    if requested == EngineTier::Quality || has_reference_image || has_continuation_token {
        EngineTier::Quality
    } else {
        EngineTier::Fast
    }
}

use std::time::Duration;

use nexora_core::tier::{EngineTier, FAST_MODEL, QUALITY_MODEL};

use crate::poll::{PollConfig, DEFAULT_MAX_POLLS};

/// Public endpoint of the generation API.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Generation client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct VeoConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Base URL of the API (default: [`DEFAULT_API_URL`]).
    pub api_url: String,
    /// Model serving the fast tier.
    pub fast_model: String,
    /// Model serving the quality tier.
    pub quality_model: String,
    pub poll: PollConfig,
}

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected} (got '{value}')")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl VeoConfig {
    /// Configuration with built-in defaults and the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            fast_model: FAST_MODEL.to_string(),
            quality_model: QUALITY_MODEL.to_string(),
            poll: PollConfig::default(),
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                              |
    /// |--------------------------|------------------------------------------------------|
    /// | `GEMINI_API_KEY`         | required (falls back to `API_KEY`)                   |
    /// | `VEO_API_URL`            | `https://generativelanguage.googleapis.com/v1beta`   |
    /// | `VEO_FAST_MODEL`         | `veo-3.1-fast-generate-preview`                      |
    /// | `VEO_QUALITY_MODEL`      | `veo-3.1-generate-preview`                           |
    /// | `VEO_POLL_INTERVAL_SECS` | `10`                                                 |
    /// | `VEO_MAX_POLLS`          | `90`                                                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|k| !k.trim().is_empty());
        let api_key = non_blank("GEMINI_API_KEY")
            .or_else(|| non_blank("API_KEY"))
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let mut config = Self::new(api_key);

        if let Some(url) = lookup("VEO_API_URL") {
            config.api_url = url;
        }
        if let Some(model) = lookup("VEO_FAST_MODEL") {
            config.fast_model = model;
        }
        if let Some(model) = lookup("VEO_QUALITY_MODEL") {
            config.quality_model = model;
        }
        if let Some(raw) = lookup("VEO_POLL_INTERVAL_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                name: "VEO_POLL_INTERVAL_SECS",
                expected: "u64",
                value: raw.clone(),
            })?;
            config.poll.interval = Duration::from_secs(secs);
        }
        let max_polls = match lookup("VEO_MAX_POLLS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "VEO_MAX_POLLS",
                expected: "u32",
                value: raw.clone(),
            })?,
            None => DEFAULT_MAX_POLLS,
        };
        config.poll.max_polls = max_polls;

        Ok(config)
    }

    /// Model identifier serving `tier`.
    pub fn model_for(&self, tier: EngineTier) -> &str {
        match tier {
            EngineTier::Fast => &self.fast_model,
            EngineTier::Quality => &self.quality_model,
        }
    }
}

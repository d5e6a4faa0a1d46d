//! `nexora-studio` -- command-line front end for the clip pipeline.
//!
//! Generates one clip for the prompt given on the command line and writes
//! the final artifact to disk. The prompt may also be a full assistant
//! reply; an embedded `[PROMPT: ...]` tag is used in its place.
//!
//! # Environment variables
//!
//! Generation client settings are documented on `VeoConfig::from_env`.
//!
//! | Variable                 | Required | Default      | Description                      |
//! |--------------------------|----------|--------------|----------------------------------|
//! | `NEXORA_TARGET_SECS`     | no       | `8`          | Target clip length in seconds    |
//! | `NEXORA_TIER`            | no       | `fast`       | `fast` or `quality`              |
//! | `NEXORA_ASPECT_RATIO`    | no       | `16:9`       | `16:9` or `9:16`                 |
//! | `NEXORA_RESOLUTION`      | no       | `720p`       | `720p` or `1080p`                |
//! | `NEXORA_REFERENCE_IMAGE` | no       | --           | Path of a still to animate       |
//! | `NEXORA_OUTPUT`          | no       | `nexora.mp4` | Where the final artifact goes    |

use std::path::Path;
use std::sync::Arc;

use nexora_core::artifact::DEFAULT_IMAGE_MIME;
use nexora_core::assistant;
use nexora_core::{
    AspectRatio, CoreError, EngineTier, GenerationConfig, GenerationRequest, ReferenceImage,
    Resolution,
};
use nexora_pipeline::Studio;
use nexora_veo::{VeoClient, VeoConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_OUTPUT: &str = "nexora.mp4";

/// Errors raised while reading the `NEXORA_*` request settings.
#[derive(Debug, thiserror::Error)]
enum SettingsError {
    #[error("{name} must be a whole number of seconds (got '{value}')")]
    InvalidDuration { name: &'static str, value: String },

    #[error("{name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: CoreError,
    },

    #[error("cannot read {name} '{path}': {source}")]
    Unreadable {
        name: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexora_studio=info,nexora_pipeline=info,nexora_veo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let veo_config = VeoConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid generation client configuration");
        std::process::exit(1);
    });

    let raw_prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let prompt = assistant::extract_prompt_suggestion(&raw_prompt).unwrap_or(raw_prompt);

    let config = request_config_from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid request settings");
        std::process::exit(1);
    });
    let output = std::env::var("NEXORA_OUTPUT").unwrap_or_else(|_| DEFAULT_OUTPUT.to_string());

    let cancel = CancellationToken::new();
    let client = VeoClient::new(veo_config).with_cancellation(cancel.clone());
    let studio = Studio::new(Arc::new(client));

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling generation");
            cancel.cancel();
        }
    });

    tracing::info!(
        prompt = %prompt,
        target_secs = config.target_duration_secs,
        tier = %config.engine_tier,
        aspect_ratio = %config.aspect_ratio,
        resolution = %config.resolution,
        "Starting nexora-studio",
    );

    let progress = |current: u32, total: u32| {
        tracing::info!(current, total, "Rendering segment {current} of {total}");
    };

    let record = match studio
        .run_pipeline(GenerationRequest::new(prompt, config), &progress)
        .await
    {
        Ok(record) => record,
        Err(failure) => {
            tracing::error!(
                headline = failure.headline,
                detail = %failure.detail(),
                step = ?failure.failed_step(),
                "{failure}",
            );
            std::process::exit(1);
        }
    };

    let bytes = record.artifact_bytes().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Could not decode final artifact");
        std::process::exit(1);
    });
    if let Err(e) = tokio::fs::write(&output, &bytes).await {
        tracing::error!(path = %output, error = %e, "Could not write artifact");
        std::process::exit(1);
    }

    tracing::info!(
        record_id = %record.id,
        title = %record.title,
        duration = %record.duration_label,
        path = %output,
        bytes = bytes.len(),
        "Clip written",
    );
}

/// Build the request configuration from `NEXORA_*` variables.
fn request_config_from_env() -> Result<GenerationConfig, SettingsError> {
    let mut config = GenerationConfig::default();

    if let Ok(raw) = std::env::var("NEXORA_TARGET_SECS") {
        let secs = raw.parse().map_err(|_| SettingsError::InvalidDuration {
            name: "NEXORA_TARGET_SECS",
            value: raw.clone(),
        })?;
        config = config.with_target_duration(secs);
    }
    if let Ok(raw) = std::env::var("NEXORA_TIER") {
        config = config.with_tier(EngineTier::parse(&raw).map_err(invalid("NEXORA_TIER"))?);
    }
    if let Ok(raw) = std::env::var("NEXORA_ASPECT_RATIO") {
        config = config
            .with_aspect_ratio(AspectRatio::parse(&raw).map_err(invalid("NEXORA_ASPECT_RATIO"))?);
    }
    if let Ok(raw) = std::env::var("NEXORA_RESOLUTION") {
        config = config
            .with_resolution(Resolution::parse(&raw).map_err(invalid("NEXORA_RESOLUTION"))?);
    }
    if let Ok(path) = std::env::var("NEXORA_REFERENCE_IMAGE") {
        let bytes = std::fs::read(&path).map_err(|source| SettingsError::Unreadable {
            name: "NEXORA_REFERENCE_IMAGE",
            path: path.clone(),
            source,
        })?;
        config = config.with_reference_image(ReferenceImage::new(bytes, image_mime(&path)));
    }

    Ok(config)
}

fn invalid(name: &'static str) -> impl FnOnce(CoreError) -> SettingsError {
    move |source| SettingsError::Invalid { name, source }
}

fn image_mime(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => DEFAULT_IMAGE_MIME,
    }
}

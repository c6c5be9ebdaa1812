use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::prompts::Prompts;

const ENV_PREFIX: &str = "GUIDE";

/// Service configuration.
///
/// Layered from built-in defaults, an optional TOML file and `GUIDE_*`
/// environment variables, where `__` separates nested keys
/// (`GUIDE_MODEL__BASE_URL`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub sampling: SamplingSettings,
    pub prompts: Prompts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 512 * 1024 * 1024,
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub base_url: String,
    pub model: String,
    /// Per-request timeout, 0 waits indefinitely.
    pub request_timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: model_client::DEFAULT_OLLAMA_URL.to_string(),
            model: "gemma3:4b".to_string(),
            request_timeout_secs: 300,
        }
    }
}

impl ModelSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    pub max_frames: usize,
    pub jpeg_quality: u8,
    /// Where uploads are staged for decoding; the system temp dir otherwise.
    pub temp_dir: Option<PathBuf>,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            max_frames: 5,
            jpeg_quality: frame_sampler::DEFAULT_JPEG_QUALITY,
            temp_dir: None,
        }
    }
}

impl Settings {
    /// Loads settings from `path` (skipped if missing) and the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: &Path, env: config::Environment) -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read configuration from {path:?}"))?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.sampling.max_frames > 0, "sampling.max_frames must be at least 1");
        ensure!(
            (1..=100).contains(&self.sampling.jpeg_quality),
            "sampling.jpeg_quality must be within 1..=100"
        );
        ensure!(!self.model.model.is_empty(), "model.model must not be empty");
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

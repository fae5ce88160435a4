use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://api.fashn.ai/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-request HTTP timeout. Distinct from the job-polling wall
    /// ceiling, which lives in the poll schedule.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscodeConfig {
    /// Longer side is scaled down to this bound; images already within
    /// it keep their dimensions (never upscaled).
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    #[serde(default = "default_quality")]
    pub quality: f32,
}

fn default_max_dimension() -> u32 {
    2000
}

fn default_quality() -> f32 {
    0.95
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            quality: default_quality(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub transcode: TranscodeConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

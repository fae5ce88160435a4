use serde::{Deserialize, Serialize};

/// Upper bound on stored reference ("model") images. Each spawns its own
/// remote job during a try-on, so the cap also bounds job fan-out.
pub const MAX_MODEL_IMAGES: usize = 4;

/// Seed used exactly once, on the very first swap/variation ever run by
/// this installation.
pub const DEFAULT_FIRST_RUN_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }
}

/// Flat settings bag persisted through the key-value store. Written by
/// the settings UI; the job client only ever writes the first-run flags.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,
    /// Reference images as data URLs, insertion order, max 4.
    #[serde(default)]
    pub model_images: Vec<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub lora_url: Option<String>,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub return_base64: bool,
    #[serde(default)]
    pub first_swap_done: bool,
    #[serde(default)]
    pub first_variation_done: bool,
}

impl Settings {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn has_model_images(&self) -> bool {
        !self.model_images.is_empty()
    }
}

/// Seed selection for swap/variation payloads. Tri-state rather than a
/// bare `Option<u64>` so the one-time default is distinguishable from a
/// user-chosen seed: consuming `FirstRunDefault` is what flips the
/// corresponding first-run flag in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedChoice {
    /// User configured an explicit seed.
    Explicit(u64),
    /// First invocation of this job type ever; use the fixed default.
    FirstRunDefault,
    /// Omit the seed and let the remote service randomize.
    Omit,
}

impl SeedChoice {
    pub fn resolve(stored_seed: Option<u64>, first_run_done: bool) -> Self {
        match stored_seed {
            Some(seed) => SeedChoice::Explicit(seed),
            None if !first_run_done => SeedChoice::FirstRunDefault,
            None => SeedChoice::Omit,
        }
    }

    pub fn value(&self) -> Option<u64> {
        match self {
            SeedChoice::Explicit(seed) => Some(*seed),
            SeedChoice::FirstRunDefault => Some(DEFAULT_FIRST_RUN_SEED),
            SeedChoice::Omit => None,
        }
    }

    /// True when resolving this choice must record that the first run
    /// has happened.
    pub fn consumes_first_run(&self) -> bool {
        matches!(self, SeedChoice::FirstRunDefault)
    }
}

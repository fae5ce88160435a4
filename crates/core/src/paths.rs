use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
}

impl Paths {
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .map(|h| h.join(".stylecast"))
            .unwrap_or_else(|| PathBuf::from(".stylecast"));
        Self { base }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.json")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base.join("settings.json")
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.base.join("downloads")
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

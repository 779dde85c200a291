use std::path::PathBuf;

/// Environment variable that relocates the profile directory.
pub const HOME_ENV: &str = "CYB3RIA_HOME";

#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
}

impl Paths {
    pub fn new() -> Self {
        if let Ok(dir) = std::env::var(HOME_ENV) {
            if !dir.trim().is_empty() {
                return Self::with_base(PathBuf::from(dir));
            }
        }
        let base = dirs::home_dir()
            .map(|h| h.join(".cyb3ria"))
            .unwrap_or_else(|| PathBuf::from(".cyb3ria"));
        Self { base }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.json")
    }

    /// Default location of the profile key-value storage.
    pub fn storage_file(&self) -> PathBuf {
        self.base.join("storage.json")
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

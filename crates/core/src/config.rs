use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::paths::Paths;

pub const DEFAULT_CHAT_ENDPOINT: &str = "wss://cyb3ria.xyz/api/ws";
pub const DEFAULT_HTTP_BASE_URL: &str = "https://cyb3ria.xyz/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatConfig {
    #[serde(default = "default_chat_endpoint")]
    pub endpoint: String,
    /// Capacity of the notification queue between the socket reader and the UI.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_chat_endpoint() -> String {
    DEFAULT_CHAT_ENDPOINT.to_string()
}

fn default_event_buffer() -> usize {
    64
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: default_chat_endpoint(),
            event_buffer: default_event_buffer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpConfig {
    /// Prefix for request paths that start with `/`.
    #[serde(default = "default_http_base_url")]
    pub base_url: String,
    /// No timeout unless set.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_http_base_url() -> String {
    DEFAULT_HTTP_BASE_URL.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_http_base_url(),
            timeout_secs: None,
            proxy: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Overrides `<home>/storage.json`.
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            debug!(path = %config_path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn storage_file(&self, paths: &Paths) -> PathBuf {
        match self.storage.file.as_deref().map(str::trim) {
            Some(file) if !file.is_empty() => PathBuf::from(file),
            _ => paths.storage_file(),
        }
    }

    /// Resolve a request target. Paths beginning with `/` are joined onto
    /// `http.baseUrl`; anything else is used untouched.
    pub fn resolve_url(&self, target: &str) -> String {
        resolve_against(&self.http.base_url, target)
    }
}

pub fn resolve_against(base_url: &str, target: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if target.starts_with('/') && !base.is_empty() {
        format!("{}{}", base, target)
    } else {
        target.to_string()
    }
}

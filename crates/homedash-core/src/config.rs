use crate::log_tail::TailerConfig;
use crate::model::IntegrationKind;
use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const BASE_URL_ENV: &str = "HOMEDASH_BASE_URL";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub highlight_ms: u64,
    pub request_timeout_secs: u64,
    /// Services last known to be connected.
    pub connected: BTreeSet<IntegrationKind>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: 2000,
            highlight_ms: 2000,
            request_timeout_secs: 30,
            connected: BTreeSet::new(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path).context("read config")?;
        let config = serde_json::from_str(&data).context("parse config")?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("create config directory")?;
        }
        let data = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, data).context("write config")?;
        Ok(())
    }

    /// Applies the flag, then the environment, over the file value.
    pub fn with_base_url_override(mut self, flag: Option<&str>, env: Option<&str>) -> Self {
        if let Some(url) = flag.or(env).map(str::trim).filter(|url| !url.is_empty()) {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn highlight_delay(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }

    pub fn tailer_config(&self) -> TailerConfig {
        TailerConfig {
            period: self.poll_interval(),
            highlight_delay: self.highlight_delay(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn set_connected(&mut self, connected: BTreeSet<IntegrationKind>) -> bool {
        if self.connected == connected {
            return false;
        }
        self.connected = connected;
        true
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let project =
        ProjectDirs::from("com", "homedash", "homedash").context("resolve project dirs")?;
    Ok(project.config_dir().join("config.json"))
}

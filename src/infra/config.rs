use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::usecase::services::paged::DEFAULT_PAGE_SIZE;

pub const API_URL_ENV: &str = "SYNC_GRID_API_URL";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub page_size: u32,
    pub cache_block_size: u32,
    pub max_blocks_in_cache: usize,
    pub resync_recheck_delay_ms: u64,
    pub notice_duration_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            cache_block_size: 100,
            max_blocks_in_cache: 10,
            resync_recheck_delay_ms: 3000,
            notice_duration_ms: 3000,
        }
    }
}

impl AppConfig {
    pub fn resync_recheck_delay(&self) -> Duration {
        Duration::from_millis(self.resync_recheck_delay_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }

    fn validate(self) -> Result<Self> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be greater than zero")
        }
        if self.cache_block_size == 0 {
            anyhow::bail!("cache_block_size must be greater than zero")
        }
        if self.api_base_url.trim().is_empty() {
            anyhow::bail!("api_base_url is required")
        }
        Ok(self)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text).context("failed to parse config")?;
        config.validate()
    }

    /// Reads `path` if it exists, falls back to defaults otherwise, then
    /// applies the environment override for the API base URL.
    pub fn load_from(path: &Path, api_url_override: Option<String>) -> Result<Self> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            Self::parse(&text)?
        } else {
            AppConfig::default()
        };

        if let Some(url) = api_url_override.filter(|url| !url.trim().is_empty()) {
            config.api_base_url = url;
        }
        config.validate()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_path()?, std::env::var(API_URL_ENV).ok())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "syncgrid", "sync-grid")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("session.sqlite"))
}

pub fn default_webview_data_dir() -> Result<PathBuf> {
    let webview_data_dir = project_dirs()?.data_local_dir().join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

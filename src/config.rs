use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::view::DashboardLimits;

pub const CONFIG_VERSION: u64 = 1;

/// Overrides `api_url` from the config file.
pub const API_URL_ENV: &str = "FINISH_IT_API_URL";

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("finish-it")
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub version: u64,
    pub api_url: String,
    pub debug_logging: bool,
    pub recent_limit: usize,
    pub upcoming_limit: usize,
    pub upcoming_window_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let limits = DashboardLimits::default();
        Self {
            version: CONFIG_VERSION,
            api_url: default_api_url(),
            debug_logging: false,
            recent_limit: limits.recent,
            upcoming_limit: limits.upcoming,
            upcoming_window_days: limits.window_days,
        }
    }
}

impl AppConfig {
    pub fn path() -> PathBuf {
        config_dir().join("config.json")
    }

    /// Load from the default location, then apply the environment override.
    pub fn load() -> Self {
        Self::load_from(&Self::path()).with_api_url(std::env::var(API_URL_ENV).ok())
    }

    /// A missing file gives the defaults; a broken one is logged and ignored.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Replace the API URL when `url` is set and non-blank.
    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        self
    }

    pub fn dashboard_limits(&self) -> DashboardLimits {
        DashboardLimits {
            recent: self.recent_limit,
            upcoming: self.upcoming_limit,
            window_days: self.upcoming_window_days,
        }
    }
}

use crate::plugins::web_buttons::activate::{DEFAULT_PREVIEW_CHARS, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";
pub const LOG_FILE: &str = "web_buttons.log";
/// Environment override for the data directory.
pub const DATA_DIR_ENV: &str = "WB_DATA_DIR";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the logger starts at debug level and honours `RUST_LOG`.
    #[serde(default)]
    pub debug_logging: bool,
    /// Write logs to `web_buttons.log` in the data directory instead of stderr.
    #[serde(default)]
    pub log_to_file: bool,
    /// Let the host check for new releases automatically.
    #[serde(default = "default_auto_update")]
    pub auto_update: bool,
    /// Include pre-releases in update checks.
    #[serde(default)]
    pub prereleases: bool,
    /// Timeout in seconds for button requests.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Number of response characters shown for quiet buttons.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    /// Unix milliseconds of the last `workflow:update` request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_requested_at: Option<i64>,
}

fn default_auto_update() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_to_file: false,
            auto_update: default_auto_update(),
            prereleases: false,
            request_timeout_secs: default_request_timeout(),
            preview_chars: default_preview_chars(),
            update_requested_at: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Directory holding the button store, settings and log file.
///
/// An explicit path wins, then `WB_DATA_DIR`, then the platform data directory.
pub fn data_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs_next::data_dir()
        .map(|d| d.join("web_buttons"))
        .unwrap_or_else(|| PathBuf::from("."))
}

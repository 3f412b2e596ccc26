use super::error::ButtonError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

pub const BUTTONS_FILE: &str = "web_buttons.json";

/// Buttons keyed by lower-cased name.
pub type ButtonMap = BTreeMap<String, ButtonRecord>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonMode {
    #[default]
    Browser,
    Quiet,
}

impl std::fmt::Display for ButtonMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ButtonMode::Browser => write!(f, "browser"),
            ButtonMode::Quiet => write!(f, "quiet"),
        }
    }
}

impl FromStr for ButtonMode {
    type Err = ButtonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(ButtonMode::Browser),
            "quiet" => Ok(ButtonMode::Quiet),
            _ => Err(ButtonError::InvalidMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonRecord {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub mode: ButtonMode,
    /// Unix milliseconds of the last activation, `0` when never used.
    #[serde(default)]
    pub last_used: i64,
}

impl ButtonRecord {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
            body: None,
            mode: ButtonMode::Browser,
            last_used: 0,
        }
    }

    /// True when activating the button requires an HTTP request rather than
    /// only opening the URL.
    pub fn has_request_data(&self) -> bool {
        !self.headers.is_empty() || !self.cookies.is_empty() || self.body.is_some()
    }
}

/// Store key for a button name.
pub fn button_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Both layouts ever written to disk: the keyed map and the older flat list.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredButtons {
    Map(BTreeMap<String, ButtonRecord>),
    List(Vec<ButtonRecord>),
}

pub fn load_buttons(path: &Path) -> Result<ButtonMap, ButtonError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ButtonMap::new()),
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(ButtonMap::new());
    }
    let stored: StoredButtons =
        serde_json::from_str(&content).map_err(|source| ButtonError::CorruptStore {
            path: path.to_path_buf(),
            source,
        })?;
    let records: Vec<(Option<String>, ButtonRecord)> = match stored {
        StoredButtons::Map(map) => map.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        StoredButtons::List(list) => list.into_iter().map(|v| (None, v)).collect(),
    };

    let mut buttons = ButtonMap::new();
    for (key, mut record) in records {
        if record.name.trim().is_empty() {
            match key {
                Some(k) if !k.trim().is_empty() => record.name = k,
                _ => {
                    tracing::warn!(url = %record.url, "dropping stored button without a name");
                    continue;
                }
            }
        }
        if record.url.trim().is_empty() {
            tracing::warn!(name = %record.name, "dropping stored button without a url");
            continue;
        }
        record.headers.retain(|k, _| !k.is_empty());
        record.cookies.retain(|k, _| !k.is_empty());
        let name = record.name.clone();
        if let Some(previous) = buttons.insert(button_key(&name), record) {
            tracing::warn!(%name, replaced = %previous.name, "stored buttons differ only in case, keeping the later one");
        }
    }
    Ok(buttons)
}

/// Load the store, treating an unreadable one as empty.
///
/// The error is handed back so the caller can show it; it is never fatal.
pub fn load_buttons_or_empty(path: &Path) -> (ButtonMap, Option<ButtonError>) {
    match load_buttons(path) {
        Ok(buttons) => (buttons, None),
        Err(e) => {
            tracing::warn!(error = %e, "starting with an empty button store");
            (ButtonMap::new(), Some(e))
        }
    }
}

pub fn save_buttons(path: &Path, buttons: &ButtonMap) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(buttons)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    tracing::debug!(count = buttons.len(), path = %path.display(), "saved buttons");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Quiet".parse::<ButtonMode>().unwrap(), ButtonMode::Quiet);
        assert_eq!(" browser ".parse::<ButtonMode>().unwrap(), ButtonMode::Browser);
        assert!(matches!(
            "loud".parse::<ButtonMode>(),
            Err(ButtonError::InvalidMode(m)) if m == "loud"
        ));
    }

    #[test]
    fn request_data_detection() {
        let mut rec = ButtonRecord::new("gh", "https://github.com");
        assert!(!rec.has_request_data());
        rec.body = Some(String::new());
        assert!(rec.has_request_data());
    }
}

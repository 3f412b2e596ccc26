use serde::{Deserialize, Serialize};

pub const ICON_WEB: &str = "web";
pub const ICON_INFO: &str = "info";
pub const ICON_ERROR: &str = "error";

/// One row of the host's result list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Action {
    #[serde(rename = "title")]
    pub label: String,
    #[serde(rename = "subtitle")]
    pub desc: String,
    /// Command line run when the row is chosen; empty for informational rows.
    #[serde(rename = "arg", default, skip_serializing_if = "String::is_empty")]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    pub icon: String,
    pub valid: bool,
}

impl Action {
    pub fn run(label: impl Into<String>, desc: impl Into<String>, action: impl Into<String>) -> Self {
        let action = action.into();
        Self {
            label: label.into(),
            desc: desc.into(),
            valid: !action.is_empty(),
            action,
            autocomplete: None,
            icon: ICON_WEB.into(),
        }
    }

    pub fn info(label: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            desc: desc.into(),
            action: String::new(),
            autocomplete: None,
            icon: ICON_INFO.into(),
            valid: false,
        }
    }

    pub fn error(label: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            icon: ICON_ERROR.into(),
            ..Self::info(label, desc)
        }
    }

    pub fn with_autocomplete(mut self, text: impl Into<String>) -> Self {
        self.autocomplete = Some(text.into());
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = icon.into();
        self
    }
}

pub mod web_buttons;

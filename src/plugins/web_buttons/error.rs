use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ButtonError {
    #[error("'{url}' is not a valid http(s) URL: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("a button named '{0}' already exists (use --force to overwrite)")]
    DuplicateName(String),
    #[error("no button named '{0}'")]
    UnknownButton(String),
    #[error("invalid mode '{0}', use 'browser' or 'quiet'")]
    InvalidMode(String),
    #[error("invalid cookie '{0}', expected name=value")]
    MalformedCookie(String),
    #[error("invalid header '{0}'")]
    InvalidHeader(String),
    #[error("button store {} could not be read: {source}", path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not open {url} in the browser: {reason}")]
    OpenBrowser { url: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ButtonError {
    /// Short title shown on the error row.
    pub fn kind(&self) -> &'static str {
        match self {
            ButtonError::InvalidUrl { .. } => "Invalid URL",
            ButtonError::DuplicateName(_) => "Duplicate button",
            ButtonError::UnknownButton(_) => "Unknown button",
            ButtonError::InvalidMode(_) => "Invalid mode",
            ButtonError::MalformedCookie(_) => "Malformed cookie",
            ButtonError::InvalidHeader(_) => "Invalid header",
            ButtonError::CorruptStore { .. } => "Corrupt button store",
            ButtonError::Network { .. } => "Network error",
            ButtonError::OpenBrowser { .. } => "Browser error",
            ButtonError::Io(_) => "I/O error",
        }
    }

    pub(crate) fn invalid_url(url: &str, reason: impl std::fmt::Display) -> Self {
        ButtonError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

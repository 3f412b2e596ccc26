use super::error::ButtonError;
use super::storage::{ButtonMode, ButtonRecord};
use crate::settings::Settings;
use anyhow::Result;
use reqwest::blocking::{Client, Request};
use reqwest::header::COOKIE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PREVIEW_CHARS: usize = 200;

/// Opens a URL in the user's browser.
pub type UrlOpener = fn(&str) -> std::io::Result<()>;

fn open_in_browser(url: &str) -> std::io::Result<()> {
    open::that(url)
}

/// Message for the host to show as a system notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonResponse {
    pub status: u16,
    pub reason: Option<&'static str>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub opened: bool,
    pub status: Option<u16>,
    pub notification: Notification,
}

/// `k=v; k2=v2`, or `None` when there are no cookies.
pub fn cookie_header(cookies: &BTreeMap<String, String>) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    Some(
        cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Trim `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

fn method_name(record: &ButtonRecord) -> &'static str {
    if record.body.is_some() {
        "POST"
    } else {
        "GET"
    }
}

pub struct Activator {
    client: Client,
    open_url: UrlOpener,
    preview_chars: usize,
}

impl Activator {
    pub fn new(timeout: Duration, preview_chars: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("web_buttons/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            open_url: open_in_browser,
            preview_chars,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            Duration::from_secs(settings.request_timeout_secs.max(1)),
            settings.preview_chars,
        )
    }

    /// Replace the browser launcher, mainly so tests never spawn a browser.
    pub fn with_opener(mut self, open_url: UrlOpener) -> Self {
        self.open_url = open_url;
        self
    }

    /// Build the request a button sends: POST with its body when one is set,
    /// otherwise GET, carrying its headers and cookies.
    pub fn request(&self, record: &ButtonRecord) -> Result<Request, ButtonError> {
        let mut builder = match &record.body {
            Some(body) => self.client.post(&record.url).body(body.clone()),
            None => self.client.get(&record.url),
        };
        for (name, value) in &record.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(cookies) = cookie_header(&record.cookies) {
            builder = builder.header(COOKIE, cookies);
        }
        builder.build().map_err(|source| ButtonError::Network {
            url: record.url.clone(),
            source,
        })
    }

    /// Send the button's request once. Failures are returned, never retried.
    pub fn send(&self, record: &ButtonRecord) -> Result<ButtonResponse, ButtonError> {
        let request = self.request(record)?;
        debug!(name = %record.name, method = method_name(record), url = %record.url, "sending request");
        let network = |source| ButtonError::Network {
            url: record.url.clone(),
            source,
        };
        let resp = self.client.execute(request).map_err(network)?;
        let status = resp.status();
        let body = resp.text().map_err(network)?;
        info!(name = %record.name, status = status.as_u16(), "request finished");
        Ok(ButtonResponse {
            status: status.as_u16(),
            reason: status.canonical_reason(),
            body,
        })
    }

    fn open(&self, url: &str) -> Result<(), ButtonError> {
        (self.open_url)(url).map_err(|e| ButtonError::OpenBrowser {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Trigger a button according to its mode.
    pub fn activate(&self, record: &ButtonRecord) -> Result<ActivationReport, ButtonError> {
        match record.mode {
            ButtonMode::Browser => {
                let response = record.has_request_data().then(|| self.send(record));
                self.open(&record.url)?;
                let title = format!("Opened {}", record.name);
                let report = match response {
                    None => ActivationReport {
                        opened: true,
                        status: None,
                        notification: Notification {
                            title,
                            body: record.url.clone(),
                        },
                    },
                    Some(Ok(resp)) => ActivationReport {
                        opened: true,
                        status: Some(resp.status),
                        notification: Notification {
                            title,
                            body: format!("{} {} returned {}", method_name(record), record.url, status_line(&resp)),
                        },
                    },
                    Some(Err(e)) => {
                        warn!(name = %record.name, error = %e, "request failed, browser opened anyway");
                        ActivationReport {
                            opened: true,
                            status: None,
                            notification: Notification {
                                title,
                                body: format!("Request failed: {e}"),
                            },
                        }
                    }
                };
                Ok(report)
            }
            ButtonMode::Quiet => {
                let resp = self.send(record)?;
                let body = truncate_preview(&resp.body, self.preview_chars);
                Ok(ActivationReport {
                    opened: false,
                    status: Some(resp.status),
                    notification: Notification {
                        title: format!("{}: {}", record.name, status_line(&resp)),
                        body: if body.is_empty() { "(empty response)".into() } else { body },
                    },
                })
            }
        }
    }

    /// Open an ad-hoc URL without a stored button.
    pub fn open_direct(&self, url: &str) -> Result<ActivationReport, ButtonError> {
        self.open(url)?;
        Ok(ActivationReport {
            opened: true,
            status: None,
            notification: Notification {
                title: "Opened URL".into(),
                body: url.to_string(),
            },
        })
    }
}

fn status_line(resp: &ButtonResponse) -> String {
    match resp.reason {
        Some(reason) => format!("HTTP {} {reason}", resp.status),
        None => format!("HTTP {}", resp.status),
    }
}

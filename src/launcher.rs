use crate::actions::web_buttons as handlers;
use crate::actions::Action;
use crate::common::command::{parse_args, ParseArgsResult};
use crate::plugins::web_buttons::activate::{Activator, Notification};
use crate::plugins::web_buttons::command::{
    parse_query, split_add_args, ParsedQuery, Verb, WorkflowCommand, CAPTURE_TOKEN,
};
use crate::plugins::web_buttons::error::ButtonError;
use crate::plugins::web_buttons::present::{self, error_item};
use crate::plugins::web_buttons::storage::{
    load_buttons_or_empty, save_buttons, ButtonMap, ButtonRecord, BUTTONS_FILE,
};
use crate::plugins::web_buttons::{env_captured_url, CaptureFn};
use crate::settings::{Settings, SETTINGS_FILE};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a handler produced for an executed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    List(Vec<Action>),
    Activate(ButtonRecord),
    OpenUrl(String),
    Done(String),
    Usage(String),
    Error { kind: &'static str, detail: String },
}

impl From<ButtonError> for Outcome {
    fn from(e: ButtonError) -> Self {
        Outcome::Error {
            kind: e.kind(),
            detail: e.to_string(),
        }
    }
}

/// Everything the binary prints for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub items: Vec<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

impl Feedback {
    pub fn items(items: Vec<Action>) -> Self {
        Self {
            items,
            notification: None,
        }
    }
}

/// One executed invocation: the store and settings are loaded up front and
/// written back only when something changed.
pub struct Session {
    store_path: PathBuf,
    settings_path: PathBuf,
    pub buttons: ButtonMap,
    pub settings: Settings,
    warnings: Vec<Action>,
    buttons_dirty: bool,
    settings_dirty: bool,
    capture: CaptureFn,
}

impl Session {
    pub fn open(data_dir: &Path) -> Self {
        let store_path = data_dir.join(BUTTONS_FILE);
        let settings_path = data_dir.join(SETTINGS_FILE);
        let (buttons, load_error) = load_buttons_or_empty(&store_path);
        let mut warnings: Vec<Action> = load_error.iter().map(error_item).collect();
        let settings = match Settings::load(&settings_path) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "settings unreadable, using defaults");
                warnings.push(Action::error("Settings error", format!("Using defaults: {e}")));
                Settings::default()
            }
        };
        Self {
            store_path,
            settings_path,
            buttons,
            settings,
            warnings,
            buttons_dirty: false,
            settings_dirty: false,
            capture: env_captured_url,
        }
    }

    pub fn with_capture(mut self, capture: CaptureFn) -> Self {
        self.capture = capture;
        self
    }

    /// Run the handler for a parsed query against the in-memory store.
    pub fn dispatch(&mut self, parsed: &ParsedQuery) -> Outcome {
        let args = parsed.arg_refs();
        match parsed.verb {
            Verb::Search | Verb::List => Outcome::List(
                handlers::list(&self.buttons, parsed.filter())
                    .into_iter()
                    .map(present::button_item)
                    .collect(),
            ),
            Verb::OpenUrl => match parsed.args.first() {
                Some(url) => Outcome::OpenUrl(url.clone()),
                None => Outcome::Usage("wb <url>".to_string()),
            },
            Verb::Open => match parse_args(&args, present::usage(Verb::Open), |a| a.first().copied()) {
                ParseArgsResult::Parsed(name) => match handlers::find(&self.buttons, name) {
                    Ok(record) => Outcome::Activate(record.clone()),
                    Err(e) => e.into(),
                },
                ParseArgsResult::Usage(u) => Outcome::Usage(u),
            },
            Verb::Add => self.add(&args),
            Verb::Adh => {
                let parsed = parse_args(&args, present::usage(Verb::Adh), |a| match a {
                    [name, header, value @ ..] if !value.is_empty() => Some((*name, *header, value.join(" "))),
                    _ => None,
                });
                match parsed {
                    ParseArgsResult::Parsed((name, header, value)) => {
                        let result = handlers::set_header(&mut self.buttons, name, header, &value)
                            .map(|()| format!("Added header '{header}' to {name}"));
                        self.mutate(result)
                    }
                    ParseArgsResult::Usage(u) => Outcome::Usage(u),
                }
            }
            Verb::Adc => match parse_args(&args, present::usage(Verb::Adc), name_and_rest) {
                ParseArgsResult::Parsed((name, spec)) => {
                    let result = handlers::add_cookies(&mut self.buttons, name, &spec)
                        .map(|n| format!("Added {n} cookie(s) to {name}"));
                    self.mutate(result)
                }
                ParseArgsResult::Usage(u) => Outcome::Usage(u),
            },
            Verb::Adb => match parse_args(&args, present::usage(Verb::Adb), name_and_rest) {
                ParseArgsResult::Parsed((name, body)) => {
                    let result = handlers::set_body(&mut self.buttons, name, &body)
                        .map(|()| format!("Added POST body to {name}"));
                    self.mutate(result)
                }
                ParseArgsResult::Usage(u) => Outcome::Usage(u),
            },
            Verb::Mode => {
                let parsed = parse_args(&args, present::usage(Verb::Mode), |a| match a {
                    [name, mode] => Some((*name, *mode)),
                    _ => None,
                });
                match parsed {
                    ParseArgsResult::Parsed((name, mode)) => {
                        let result = handlers::set_mode(&mut self.buttons, name, mode)
                            .map(|m| format!("Mode for '{name}' set to: {m}"));
                        self.mutate(result)
                    }
                    ParseArgsResult::Usage(u) => Outcome::Usage(u),
                }
            }
            Verb::Remove => {
                let parsed = parse_args(&args, present::usage(Verb::Remove), |a| match a {
                    [name] => Some(*name),
                    _ => None,
                });
                match parsed {
                    ParseArgsResult::Parsed(name) => {
                        let result =
                            handlers::remove(&mut self.buttons, name).map(|r| format!("Removed web button: {}", r.name));
                        self.mutate(result)
                    }
                    ParseArgsResult::Usage(u) => Outcome::Usage(u),
                }
            }
            Verb::Workflow(cmd) => self.workflow(cmd),
        }
    }

    fn add(&mut self, args: &[&str]) -> Outcome {
        let (url, name, force) = split_add_args(args);
        let Some(url) = url else {
            return Outcome::Usage(present::usage(Verb::Add).to_string());
        };
        let url = if url == CAPTURE_TOKEN {
            match (self.capture)() {
                Some(tab) => tab,
                None => return ButtonError::invalid_url(url, "no active browser tab URL was captured").into(),
            }
        } else {
            url.to_string()
        };
        let result = handlers::add(&mut self.buttons, &url, name, force)
            .map(|r| format!("Added web button: {} ({})", r.name, r.url));
        self.mutate(result)
    }

    fn mutate(&mut self, result: Result<String, ButtonError>) -> Outcome {
        match result {
            Ok(message) => {
                info!("{message}");
                self.buttons_dirty = true;
                Outcome::Done(message)
            }
            Err(e) => {
                warn!(error = %e, "command failed");
                e.into()
            }
        }
    }

    fn workflow(&mut self, cmd: WorkflowCommand) -> Outcome {
        let message = match cmd {
            WorkflowCommand::Update => {
                self.settings.update_requested_at = Some(handlers::now_millis());
                format!(
                    "Update check requested (version {}, pre-releases {})",
                    env!("CARGO_PKG_VERSION"),
                    if self.settings.prereleases { "included" } else { "skipped" }
                )
            }
            WorkflowCommand::AutoUpdate => {
                self.settings.auto_update = true;
                "Automatic updates turned on".to_string()
            }
            WorkflowCommand::NoAutoUpdate => {
                self.settings.auto_update = false;
                "Automatic updates turned off".to_string()
            }
            WorkflowCommand::Prereleases => {
                self.settings.prereleases = true;
                "Pre-releases will be included in updates".to_string()
            }
            WorkflowCommand::NoPrereleases => {
                self.settings.prereleases = false;
                "Pre-releases will be skipped".to_string()
            }
        };
        self.settings_dirty = true;
        Outcome::Done(message)
    }

    /// Turn an outcome into output, running activation when asked to.
    pub fn finish(&mut self, outcome: Outcome, activator: &Activator) -> Feedback {
        let mut feedback = match outcome {
            Outcome::List(items) if items.is_empty() => Feedback::items(vec![Action::error(
                "No matching web buttons found",
                "Try 'wb add <url>' to create one",
            )]),
            Outcome::List(items) => Feedback::items(items),
            Outcome::Activate(record) => match activator.activate(&record) {
                Ok(report) => {
                    if let Err(e) = handlers::mark_used(&mut self.buttons, &record.name, handlers::now_millis()) {
                        warn!(error = %e, "could not record button use");
                    } else {
                        self.buttons_dirty = true;
                    }
                    Feedback {
                        items: Vec::new(),
                        notification: Some(report.notification),
                    }
                }
                Err(e) => Feedback::items(vec![error_item(&e)]),
            },
            Outcome::OpenUrl(url) => match activator.open_direct(&url) {
                Ok(report) => Feedback {
                    items: Vec::new(),
                    notification: Some(report.notification),
                },
                Err(e) => Feedback::items(vec![error_item(&e)]),
            },
            Outcome::Done(message) => Feedback::items(vec![Action::info("Done", message)]),
            Outcome::Usage(usage) => Feedback::items(vec![Action::info("Usage", usage)]),
            Outcome::Error { kind, detail } => Feedback::items(vec![Action::error(kind, detail)]),
        };
        if let Err(e) = self.save() {
            warn!(error = %e, "failed to persist changes");
            feedback.items.push(Action::error("Save failed", e.to_string()));
        }
        let mut items = std::mem::take(&mut self.warnings);
        items.append(&mut feedback.items);
        feedback.items = items;
        feedback
    }

    /// Parse, handle and persist one executed query.
    pub fn run(&mut self, query: &str, activator: &Activator) -> Feedback {
        let parsed = parse_query(query);
        let outcome = self.dispatch(&parsed);
        self.finish(outcome, activator)
    }

    pub fn save(&mut self) -> anyhow::Result<()> {
        if self.buttons_dirty {
            save_buttons(&self.store_path, &self.buttons)?;
            self.buttons_dirty = false;
        }
        if self.settings_dirty {
            self.settings.save(&self.settings_path)?;
            self.settings_dirty = false;
        }
        Ok(())
    }
}

fn name_and_rest<'a>(args: &[&'a str]) -> Option<(&'a str, String)> {
    match args {
        [name, rest @ ..] if !rest.is_empty() => Some((*name, rest.join(" "))),
        _ => None,
    }
}

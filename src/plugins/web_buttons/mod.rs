pub mod activate;
pub mod command;
pub mod error;
pub mod present;
pub mod storage;

use crate::actions::web_buttons as handlers;
use crate::actions::{Action, ICON_ERROR, ICON_INFO};
use crate::common::slug::generate_name;
use crate::plugin::Plugin;
use crate::settings::{Settings, SETTINGS_FILE};
use error::ButtonError;
use command::{command_line, parse_query, split_add_args, ParsedQuery, Verb, WorkflowCommand, CAPTURE_TOKEN, FORCE_FLAG};
use present::{error_item, unknown_button_items, usage_item};
use std::path::PathBuf;
use storage::{load_buttons_or_empty, ButtonMap, BUTTONS_FILE};

/// Environment variable through which the host passes the active tab's URL.
pub const CAPTURED_URL_ENV: &str = "WB_CAPTURED_URL";

/// Returns the URL of the browser tab the host captured, if any.
pub type CaptureFn = fn() -> Option<String>;

pub fn env_captured_url() -> Option<String> {
    std::env::var(CAPTURED_URL_ENV)
        .ok()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
}

/// Read-only rendering of a query while it is being typed.
///
/// Nothing here writes to disk; executing the chosen row goes through
/// [`crate::launcher::Session`].
pub struct WebButtonsPlugin {
    data_dir: PathBuf,
    capture: CaptureFn,
}

impl WebButtonsPlugin {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::new_with_capture(data_dir, env_captured_url)
    }

    pub fn new_with_capture(data_dir: impl Into<PathBuf>, capture: CaptureFn) -> Self {
        Self {
            data_dir: data_dir.into(),
            capture,
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(BUTTONS_FILE)
    }

    /// Current settings, plus an error row when the file is unreadable and
    /// defaults are shown instead.
    fn settings(&self) -> (Settings, Option<Action>) {
        match Settings::load(&self.data_dir.join(SETTINGS_FILE)) {
            Ok(settings) => (settings, None),
            Err(e) => {
                tracing::warn!(error = %e, "settings unreadable, previewing defaults");
                (
                    Settings::default(),
                    Some(Action::error("Settings error", format!("Using defaults: {e}"))),
                )
            }
        }
    }

    fn preview(&self, buttons: &ButtonMap, parsed: &ParsedQuery) -> Vec<Action> {
        let args = parsed.arg_refs();
        match parsed.verb {
            Verb::Search | Verb::List => present::search_items(buttons, parsed.filter()),
            Verb::OpenUrl => match parsed.args.first() {
                Some(url) => present::url_items(url),
                None => vec![Action::info("Usage", "wb <url>")],
            },
            Verb::Add => self.preview_add(buttons, &args),
            Verb::Adh => preview_adh(buttons, &args),
            Verb::Adc => preview_adc(buttons, &args),
            Verb::Adb => preview_adb(buttons, &args),
            Verb::Mode => preview_mode(buttons, &args),
            Verb::Remove => preview_remove(buttons, &args),
            Verb::Open => preview_open(buttons, &args),
            Verb::Workflow(cmd) => {
                let (settings, error) = self.settings();
                error.into_iter().chain(preview_workflow(&settings, cmd)).collect()
            }
        }
    }

    fn preview_add(&self, buttons: &ButtonMap, args: &[&str]) -> Vec<Action> {
        let captured = (self.capture)();
        let (url, name, force) = split_add_args(args);
        let Some(url) = url else {
            let mut items = vec![usage_item(Verb::Add)];
            if let Some(tab) = captured {
                items.push(
                    Action::info(format!("Add current tab: {tab}"), "Use the URL of the active browser tab")
                        .with_autocomplete(format!("{} ", command_line(Verb::Add, &[tab.as_str()]))),
                );
            }
            return items;
        };
        let url = if url == CAPTURE_TOKEN {
            match captured {
                Some(tab) => tab,
                None => {
                    return vec![Action::error(
                        "No captured URL",
                        format!("The host did not provide the active tab URL (${CAPTURED_URL_ENV})"),
                    )]
                }
            }
        } else {
            url.to_string()
        };
        let parsed = match handlers::normalize_url(&url) {
            Ok((_, parsed)) => parsed,
            Err(e) => return vec![error_item(&e)],
        };
        let name = name.map(str::to_string).unwrap_or_else(|| generate_name(&parsed));

        let mut scratch = buttons.clone();
        if let Err(e) = handlers::add(&mut scratch, &url, Some(&name), force) {
            let mut items = vec![error_item(&e)];
            if matches!(e, ButtonError::DuplicateName(_)) {
                items.push(
                    Action::info("Overwrite it", format!("Add {FORCE_FLAG} to replace '{name}'")).with_autocomplete(
                        format!("{} ", command_line(Verb::Add, &[url.as_str(), name.as_str(), FORCE_FLAG])),
                    ),
                );
            }
            return items;
        }
        let mut cmd = vec![url.as_str(), name.as_str()];
        if force {
            cmd.push(FORCE_FLAG);
        }
        let title = if force && buttons.contains_key(&storage::button_key(&name)) {
            format!("Replace web button: {name}")
        } else {
            format!("Add web button: {name}")
        };
        let mut item = Action::run(title, format!("URL: {url}"), command_line(Verb::Add, &cmd));
        if args.contains(&CAPTURE_TOKEN) {
            item = item.with_autocomplete(format!("{} ", command_line(Verb::Add, &[url.as_str()])));
        }
        vec![item]
    }
}

impl Default for WebButtonsPlugin {
    fn default() -> Self {
        Self::new(crate::settings::data_dir(None))
    }
}

/// Look up the button named by the first argument, or render why it can't be used.
fn known_button<'a>(
    buttons: &'a ButtonMap,
    verb: Verb,
    args: &[&str],
) -> Result<&'a storage::ButtonRecord, Vec<Action>> {
    let Some(name) = args.first() else {
        let mut items = vec![usage_item(verb)];
        items.extend(present::pick_button_items(buttons, verb, ""));
        return Err(items);
    };
    handlers::find(buttons, name).map_err(|_| unknown_button_items(buttons, verb, name))
}

fn preview_adh(buttons: &ButtonMap, args: &[&str]) -> Vec<Action> {
    let record = match known_button(buttons, Verb::Adh, args) {
        Ok(r) => r,
        Err(items) => return items,
    };
    if args.len() < 3 {
        let mut items = vec![Action::info(
            format!("Add header to {}", record.name),
            format!("Usage: wb adh {} \"<header-name>\" \"<header-value>\"", record.name),
        )];
        items.extend(
            record
                .headers
                .iter()
                .map(|(k, v)| Action::info(format!("{k}: {v}"), "Current header")),
        );
        return items;
    }
    let (header, value) = (args[1], args[2..].join(" "));
    let mut scratch = buttons.clone();
    match handlers::set_header(&mut scratch, &record.name, header, &value) {
        Ok(()) => vec![Action::run(
            format!("Add header to {}", record.name),
            format!("{header}: {value}"),
            command_line(Verb::Adh, &[record.name.as_str(), header, value.as_str()]),
        )],
        Err(e) => vec![error_item(&e)],
    }
}

fn preview_adc(buttons: &ButtonMap, args: &[&str]) -> Vec<Action> {
    let record = match known_button(buttons, Verb::Adc, args) {
        Ok(r) => r,
        Err(items) => return items,
    };
    if args.len() < 2 {
        return vec![Action::info(
            format!("Add cookie(s) to {}", record.name),
            format!("Usage: wb adc {} \"name1=value1; name2=value2\"", record.name),
        )];
    }
    let spec = args[1..].join(" ");
    match handlers::parse_cookies(&spec) {
        Ok(cookies) => {
            let mut items = vec![Action::run(
                format!("Add {} cookie(s) to {}", cookies.len(), record.name),
                format!("Cookies: {spec}"),
                command_line(Verb::Adc, &[record.name.as_str(), spec.as_str()]),
            )];
            items.extend(cookies.iter().map(|(k, v)| {
                Action::info(format!("Adding cookie: {k}={v}"), format!("To button: {}", record.name))
            }));
            items
        }
        Err(e) => vec![error_item(&e)],
    }
}

fn preview_adb(buttons: &ButtonMap, args: &[&str]) -> Vec<Action> {
    let record = match known_button(buttons, Verb::Adb, args) {
        Ok(r) => r,
        Err(items) => return items,
    };
    if args.len() < 2 {
        let mut items = vec![Action::info(
            format!("Add POST body to {}", record.name),
            format!("Usage: wb adb {} \"<body>\"", record.name),
        )];
        if let Some(body) = &record.body {
            items.push(Action::info("Current POST body", body.clone()));
        }
        return items;
    }
    let body = args[1..].join(" ");
    vec![Action::run(
        format!("Add POST body to {}", record.name),
        format!("Body: {body}"),
        command_line(Verb::Adb, &[record.name.as_str(), body.as_str()]),
    )]
}

fn preview_mode(buttons: &ButtonMap, args: &[&str]) -> Vec<Action> {
    let record = match known_button(buttons, Verb::Mode, args) {
        Ok(r) => r,
        Err(items) => return items,
    };
    let current = format!("Currently: {}", record.mode);
    let Some(mode) = args.get(1) else {
        return ["browser", "quiet"]
            .into_iter()
            .map(|m| {
                Action::run(
                    format!("Set {m} mode for {}", record.name),
                    current.clone(),
                    command_line(Verb::Mode, &[record.name.as_str(), m]),
                )
            })
            .collect();
    };
    match mode.parse::<storage::ButtonMode>() {
        Ok(mode) => {
            let mode = mode.to_string();
            vec![Action::run(
                format!("Set mode for {}: {mode}", record.name),
                current,
                command_line(Verb::Mode, &[record.name.as_str(), mode.as_str()]),
            )]
        }
        Err(e) => vec![error_item(&e)],
    }
}

fn preview_remove(buttons: &ButtonMap, args: &[&str]) -> Vec<Action> {
    match known_button(buttons, Verb::Remove, args) {
        Ok(record) => vec![Action::run(
            format!("Remove web button: {}", record.name),
            "This action cannot be undone",
            command_line(Verb::Remove, &[record.name.as_str()]),
        )
        .with_icon(ICON_ERROR)],
        Err(items) => items,
    }
}

fn preview_open(buttons: &ButtonMap, args: &[&str]) -> Vec<Action> {
    match known_button(buttons, Verb::Open, args) {
        Ok(record) => vec![present::button_item(record)],
        Err(items) => items,
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn preview_workflow(settings: &Settings, cmd: WorkflowCommand) -> Vec<Action> {
    let (title, desc) = match cmd {
        WorkflowCommand::Update => ("Check for updates", format!("Auto update is {}", on_off(settings.auto_update))),
        WorkflowCommand::AutoUpdate => ("Turn on automatic updates", format!("Currently {}", on_off(settings.auto_update))),
        WorkflowCommand::NoAutoUpdate => ("Turn off automatic updates", format!("Currently {}", on_off(settings.auto_update))),
        WorkflowCommand::Prereleases => ("Include pre-releases in updates", format!("Currently {}", on_off(settings.prereleases))),
        WorkflowCommand::NoPrereleases => ("Skip pre-releases in updates", format!("Currently {}", on_off(settings.prereleases))),
    };
    vec![Action::run(title, desc, cmd.keyword()).with_icon(ICON_INFO)]
}

impl Plugin for WebButtonsPlugin {
    fn search(&self, query: &str) -> Vec<Action> {
        if query.trim().is_empty() {
            return self.commands();
        }
        let (buttons, load_error) = load_buttons_or_empty(&self.store_path());
        let parsed = parse_query(query);
        let mut items: Vec<Action> = load_error.iter().map(error_item).collect();
        items.extend(self.preview(&buttons, &parsed));
        items
    }

    fn name(&self) -> &str {
        "web_buttons"
    }

    fn description(&self) -> &str {
        "Named URL shortcuts with headers, cookies and POST bodies (prefix: `wb`)"
    }

    fn capabilities(&self) -> &[&str] {
        &["search"]
    }

    fn commands(&self) -> Vec<Action> {
        present::help_items()
    }
}

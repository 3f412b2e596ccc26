//! Turns buttons, errors and usage hints into result rows.

use super::command::{command_line, Verb, WorkflowCommand};
use super::error::ButtonError;
use super::storage::{ButtonMap, ButtonMode, ButtonRecord};
use crate::actions::web_buttons::list;
use crate::actions::{Action, ICON_ERROR, ICON_INFO, ICON_WEB};
use crate::common::query::looks_like_url;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Usage line and description for each keyword verb, in help order.
pub const COMMANDS: &[(Verb, &str, &str)] = &[
    (Verb::Add, "wb add <url> [name] [--force]", "Add a new web button (`:cap` uses the current tab)"),
    (Verb::Adh, "wb adh <button> <header> <value>", "Add a header to a button (quote values with spaces)"),
    (Verb::Adc, "wb adc <button> \"name1=value1; name2=value2\"", "Add one or more cookies to a button"),
    (Verb::Adb, "wb adb <button> <body>", "Add a POST body to a button"),
    (Verb::Mode, "wb mode <button> <browser|quiet>", "Set button mode"),
    (Verb::Remove, "wb remove <button>", "Remove a web button"),
    (Verb::List, "wb list [filter]", "List web buttons, most recently used first"),
    (Verb::Open, "wb open <button>", "Trigger a web button"),
];

const SUGGESTION_LIMIT: usize = 3;

pub fn usage(verb: Verb) -> &'static str {
    COMMANDS
        .iter()
        .find(|(v, _, _)| *v == verb)
        .map(|(_, usage, _)| *usage)
        .unwrap_or("wb <query>")
}

/// `URL: <url> (2 headers, 1 cookies, POST, mode: quiet)`
pub fn button_subtitle(record: &ButtonRecord) -> String {
    let mut parts = Vec::new();
    if !record.headers.is_empty() {
        parts.push(format!("{} headers", record.headers.len()));
    }
    if !record.cookies.is_empty() {
        parts.push(format!("{} cookies", record.cookies.len()));
    }
    if record.body.is_some() {
        parts.push("POST".to_string());
    }
    parts.push(format!("mode: {}", record.mode));
    format!("URL: {} ({})", record.url, parts.join(", "))
}

pub fn button_item(record: &ButtonRecord) -> Action {
    Action::run(
        record.name.clone(),
        button_subtitle(record),
        command_line(Verb::Open, &[record.name.as_str()]),
    )
    .with_autocomplete(record.name.clone())
}

/// Follow-up rows shown when a search narrows down to a single button.
pub fn button_detail_items(record: &ButtonRecord) -> Vec<Action> {
    let name = record.name.as_str();
    let prefill = |verb: Verb| format!("{} ", command_line(verb, &[name]));
    vec![
        Action::run(format!("Open {name}"), button_subtitle(record), command_line(Verb::Open, &[name]))
            .with_autocomplete(name),
        Action::info(format!("Add Header to {name}"), "↵ to add a header").with_autocomplete(prefill(Verb::Adh)),
        Action::info(format!("Add Cookie to {name}"), "↵ to add a cookie").with_autocomplete(prefill(Verb::Adc)),
        Action::info(format!("Add POST Body to {name}"), "↵ to add a POST body")
            .with_autocomplete(prefill(Verb::Adb)),
        Action::info(format!("Set Mode for {name}"), format!("Current mode: {}", record.mode))
            .with_autocomplete(prefill(Verb::Mode)),
        Action::run(format!("Remove {name}"), "↵ to remove this button", command_line(Verb::Remove, &[name]))
            .with_icon(ICON_ERROR),
    ]
}

pub fn error_item(err: &ButtonError) -> Action {
    Action::error(err.kind(), err.to_string())
}

pub fn usage_item(verb: Verb) -> Action {
    Action::info("Usage", usage(verb))
}

/// Buttons whose names fuzzily resemble `name`, best first.
pub fn suggest_names<'a>(buttons: &'a ButtonMap, name: &str) -> Vec<&'a ButtonRecord> {
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &ButtonRecord)> = buttons
        .values()
        .filter_map(|b| matcher.fuzzy_match(&b.name, name).map(|score| (score, b)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));
    scored.into_iter().take(SUGGESTION_LIMIT).map(|(_, b)| b).collect()
}

/// Error row for a missing button plus "did you mean" rows that re-enter the
/// same command with a known name.
pub fn unknown_button_items(buttons: &ButtonMap, verb: Verb, name: &str) -> Vec<Action> {
    let mut items = vec![Action::error(
        ButtonError::UnknownButton(name.to_string()).kind(),
        format!("No button named '{name}'. Create it first with 'wb add <url> {name}'"),
    )];
    for candidate in suggest_names(buttons, name) {
        items.push(
            Action::info(format!("Did you mean '{}'?", candidate.name), candidate.url.clone())
                .with_autocomplete(format!("{} ", command_line(verb, &[candidate.name.as_str()]))),
        );
    }
    items
}

/// Rows listing every button with its mode, used while a name is still being typed.
pub fn pick_button_items(buttons: &ButtonMap, verb: Verb, filter: &str) -> Vec<Action> {
    list(buttons, filter)
        .into_iter()
        .map(|b| {
            let icon = match b.mode {
                ButtonMode::Browser => ICON_WEB,
                ButtonMode::Quiet => ICON_INFO,
            };
            Action::info(format!("{} ({})", b.name, b.mode), button_subtitle(b))
                .with_autocomplete(format!("{} ", command_line(verb, &[b.name.as_str()])))
                .with_icon(icon)
        })
        .collect()
}

pub fn help_items() -> Vec<Action> {
    let mut items: Vec<Action> = COMMANDS
        .iter()
        .map(|(verb, usage, desc)| {
            let keyword = verb.keyword().unwrap_or_default();
            Action::info(*desc, *usage).with_autocomplete(format!("{keyword} "))
        })
        .collect();
    items.push(Action::info("Search and Open", "wb <query>"));
    items.push(
        Action::info("Check for Updates", "wb workflow:update")
            .with_autocomplete(WorkflowCommand::Update.keyword()),
    );
    items.push(Action::info(
        "Toggle Auto Update",
        "wb workflow:autoupdate / workflow:noautoupdate",
    ));
    items.push(Action::info(
        "Toggle Pre-releases",
        "wb workflow:prereleases / workflow:noprereleases",
    ));
    items
}

/// Commands whose keyword starts with the query.
pub fn command_suggestions(query: &str) -> Vec<Action> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    COMMANDS
        .iter()
        .filter_map(|(verb, _, desc)| {
            let keyword = verb.keyword()?;
            keyword
                .starts_with(&query)
                .then(|| Action::info(format!("Command: {keyword}"), *desc).with_autocomplete(format!("{keyword} ")))
        })
        .collect()
}

/// Rows offering to open or save a URL that no button matches.
pub fn url_items(url: &str) -> Vec<Action> {
    vec![
        Action::run(
            format!("Open URL: {url}"),
            "↵ to open this URL directly in your browser",
            normalized_for_open(url),
        ),
        Action::run(
            format!("Add as new web button: {url}"),
            "↵ to add this URL as a new web button",
            command_line(Verb::Add, &[url]),
        ),
    ]
}

fn normalized_for_open(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Full result list for a search or `list` query.
pub fn search_items(buttons: &ButtonMap, filter: &str) -> Vec<Action> {
    let matches = list(buttons, filter);
    let mut items = Vec::new();
    match matches.as_slice() {
        [] if looks_like_url(filter) => items.extend(url_items(filter.trim())),
        [] => items.push(Action::error(
            "No matching web buttons found",
            "Try 'wb add <url>' to create one",
        )),
        [only] if !filter.trim().is_empty() => items.extend(button_detail_items(only)),
        many => items.extend(many.iter().map(|b| button_item(b))),
    }
    let commands = command_suggestions(filter);
    if !commands.is_empty() && !matches.is_empty() {
        items.push(Action::info(
            "──────────── Commands ────────────",
            "Available commands matching your search",
        ));
    }
    items.extend(commands);
    items
}

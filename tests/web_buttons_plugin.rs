use std::path::Path;
use tempfile::tempdir;
use web_buttons::actions::web_buttons::{add, set_mode};
use web_buttons::actions::{ICON_ERROR, ICON_INFO};
use web_buttons::plugin::{Plugin, PluginManager};
use web_buttons::plugins::web_buttons::command::{parse_query, Verb};
use web_buttons::plugins::web_buttons::storage::{save_buttons, ButtonMap, BUTTONS_FILE};
use web_buttons::plugins::web_buttons::WebButtonsPlugin;

fn no_tab() -> Option<String> {
    None
}

fn hn_tab() -> Option<String> {
    Some("https://news.ycombinator.com/item?id=1".into())
}

fn seed(dir: &Path, entries: &[(&str, &str)]) {
    let mut buttons = ButtonMap::new();
    for (url, name) in entries {
        add(&mut buttons, url, Some(name), false).unwrap();
    }
    save_buttons(&dir.join(BUTTONS_FILE), &buttons).unwrap();
}

fn plugin(dir: &Path) -> WebButtonsPlugin {
    WebButtonsPlugin::new_with_capture(dir, no_tab)
}

#[test]
fn empty_query_lists_commands() {
    let dir = tempdir().unwrap();
    let results = plugin(dir.path()).search("   ");
    assert!(results.len() >= 8);
    assert_eq!(results[0].desc, "wb add <url> [name] [--force]");
    assert_eq!(results[0].autocomplete.as_deref(), Some("add "));
    assert!(results.iter().all(|a| !a.valid));
}

#[test]
fn search_never_writes() {
    let dir = tempdir().unwrap();
    let p = plugin(dir.path());
    p.search("add https://github.com");
    p.search("workflow:noautoupdate");
    assert!(!dir.path().join(BUTTONS_FILE).exists());
    assert!(!dir.path().join("settings.json").exists());
}

#[test]
fn add_preview_derives_name() {
    let dir = tempdir().unwrap();
    let results = plugin(dir.path()).search("add https://github.com");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].label, "Add web button: github");
    assert_eq!(results[0].action, "add https://github.com github");
    assert!(results[0].valid);
    let reparsed = parse_query(&results[0].action);
    assert_eq!(reparsed.verb, Verb::Add);
    assert_eq!(reparsed.args, vec!["https://github.com", "github"]);
}

#[test]
fn add_preview_reports_bad_urls() {
    let dir = tempdir().unwrap();
    let results = plugin(dir.path()).search("add ftp://example.com");
    assert_eq!(results[0].label, "Invalid URL");
    assert_eq!(results[0].icon, ICON_ERROR);
    assert!(!results[0].valid);
}

#[test]
fn duplicate_add_offers_overwrite() {
    let dir = tempdir().unwrap();
    seed(dir.path(), &[("https://github.com", "github")]);
    let results = plugin(dir.path()).search("add https://github.com/rust-lang");
    assert_eq!(results[0].label, "Duplicate button");
    assert_eq!(results[1].label, "Overwrite it");
    assert_eq!(
        results[1].autocomplete.as_deref(),
        Some("add https://github.com/rust-lang github --force ")
    );

    let forced = plugin(dir.path()).search("add https://github.com/rust-lang github --force");
    assert_eq!(forced[0].label, "Replace web button: github");
    assert_eq!(forced[0].action, "add https://github.com/rust-lang github --force");
}

#[test]
fn capture_token_uses_the_active_tab() {
    let dir = tempdir().unwrap();
    let p = WebButtonsPlugin::new_with_capture(dir.path(), hn_tab);
    let results = p.search("add :cap");
    assert_eq!(results[0].label, "Add web button: news-ycombinator");
    assert_eq!(
        results[0].action,
        "add https://news.ycombinator.com/item?id=1 news-ycombinator"
    );
    assert_eq!(
        results[0].autocomplete.as_deref(),
        Some("add https://news.ycombinator.com/item?id=1 ")
    );

    let bare = p.search("add");
    assert_eq!(bare[0].label, "Usage");
    assert_eq!(bare[1].label, "Add current tab: https://news.ycombinator.com/item?id=1");
}

#[test]
fn capture_token_without_tab_is_an_error() {
    let dir = tempdir().unwrap();
    let results = plugin(dir.path()).search("add :cap");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].label, "No captured URL");
    assert_eq!(results[0].icon, ICON_ERROR);
}

#[test]
fn unknown_button_suggests_close_names() {
    let dir = tempdir().unwrap();
    seed(dir.path(), &[("https://github.com", "github"), ("https://docs.rs", "docs")]);
    let results = plugin(dir.path()).search("adh gthub");
    assert_eq!(results[0].label, "Unknown button");
    assert_eq!(results[1].label, "Did you mean 'github'?");
    assert_eq!(results[1].autocomplete.as_deref(), Some("adh github "));
}

#[test]
fn cookie_preview_shows_each_cookie() {
    let dir = tempdir().unwrap();
    seed(dir.path(), &[("https://api.example.com", "api")]);
    let results = plugin(dir.path()).search(r#"adc api "session=abc123; theme=dark""#);
    assert_eq!(results[0].label, "Add 2 cookie(s) to api");
    assert_eq!(results[0].action, r#"adc api "session=abc123; theme=dark""#);
    assert_eq!(results[1].label, "Adding cookie: session=abc123");
    assert_eq!(results[2].label, "Adding cookie: theme=dark");

    let bad = plugin(dir.path()).search(r#"adc api "broken""#);
    assert_eq!(bad[0].label, "Malformed cookie");
}

#[test]
fn mode_preview_offers_both_modes() {
    let dir = tempdir().unwrap();
    seed(dir.path(), &[("https://api.example.com", "api")]);
    let results = plugin(dir.path()).search("mode api");
    let actions: Vec<_> = results.iter().map(|a| a.action.as_str()).collect();
    assert_eq!(actions, vec!["mode api browser", "mode api quiet"]);

    let bad = plugin(dir.path()).search("mode api loud");
    assert_eq!(bad[0].label, "Invalid mode");
}

#[test]
fn search_narrows_to_detail_rows() {
    let dir = tempdir().unwrap();
    seed(
        dir.path(),
        &[("https://github.com", "github"), ("https://gitlab.com", "gitlab")],
    );
    let many = plugin(dir.path()).search("git");
    assert_eq!(many.len(), 2);
    assert_eq!(many[0].action, "open github");

    let one = plugin(dir.path()).search("hub");
    assert_eq!(one[0].label, "Open github");
    assert_eq!(one[0].action, "open github");
    assert!(one.iter().any(|a| a.autocomplete.as_deref() == Some("adh github ")));
    assert!(one.iter().any(|a| a.action == "remove github"));
}

#[test]
fn subtitle_summarises_request_data() {
    let dir = tempdir().unwrap();
    let mut buttons = ButtonMap::new();
    add(&mut buttons, "https://api.example.com", Some("api"), false).unwrap();
    set_mode(&mut buttons, "api", "quiet").unwrap();
    web_buttons::actions::web_buttons::add_cookies(&mut buttons, "api", "a=1").unwrap();
    save_buttons(&dir.path().join(BUTTONS_FILE), &buttons).unwrap();

    let results = plugin(dir.path()).search("list");
    assert_eq!(results[0].desc, "URL: https://api.example.com (1 cookies, mode: quiet)");
}

#[test]
fn unmatched_url_offers_open_and_add() {
    let dir = tempdir().unwrap();
    let results = plugin(dir.path()).search("example.com/docs");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].action, "https://example.com/docs");
    assert_eq!(results[1].action, "add example.com/docs");

    let bare = plugin(dir.path()).search("https://example.com");
    assert_eq!(bare[0].label, "Open URL: https://example.com");
}

#[test]
fn nothing_found_is_an_error_row() {
    let dir = tempdir().unwrap();
    let results = plugin(dir.path()).search("zzz");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].label, "No matching web buttons found");
}

#[test]
fn command_prefix_suggests_commands() {
    let dir = tempdir().unwrap();
    seed(dir.path(), &[("https://ads.example.com", "adsense")]);
    let results = plugin(dir.path()).search("ad");
    assert_eq!(results[0].label, "Open adsense");
    let separator = results.iter().position(|a| a.label.contains("Commands")).unwrap();
    let commands: Vec<_> = results[separator + 1..]
        .iter()
        .map(|a| a.label.as_str())
        .collect();
    assert_eq!(
        commands,
        vec!["Command: add", "Command: adh", "Command: adc", "Command: adb"]
    );
}

#[test]
fn corrupt_store_is_shown_first() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(BUTTONS_FILE), "[{").unwrap();
    let results = plugin(dir.path()).search("github");
    assert_eq!(results[0].label, "Corrupt button store");
    assert_eq!(results[1].label, "No matching web buttons found");
}

#[test]
fn workflow_preview_reflects_settings() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("settings.json"), r#"{"auto_update": false}"#).unwrap();
    let results = plugin(dir.path()).search("workflow:autoupdate");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].desc, "Currently off");
    assert_eq!(results[0].action, "workflow:autoupdate");
    assert_eq!(results[0].icon, ICON_INFO);
}

#[test]
fn unreadable_settings_are_reported_in_workflow_preview() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("settings.json"), "{").unwrap();
    let results = plugin(dir.path()).search("workflow:autoupdate");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].label, "Settings error");
    assert_eq!(results[0].icon, ICON_ERROR);
    assert_eq!(results[1].action, "workflow:autoupdate");
    assert_eq!(results[1].desc, "Currently on");
}

#[test]
fn manager_collects_plugin_rows() {
    let dir = tempdir().unwrap();
    seed(dir.path(), &[("https://github.com", "github")]);
    let mut manager = PluginManager::new();
    manager.register(Box::new(plugin(dir.path())));
    let results = manager.search("open github");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].action, "open github");
    assert!(!manager.commands().is_empty());
}

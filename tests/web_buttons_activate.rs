use httpmock::prelude::*;
use once_cell::sync::Lazy;
use std::sync::Mutex;
use std::time::Duration;
use web_buttons::plugins::web_buttons::activate::Activator;
use web_buttons::plugins::web_buttons::error::ButtonError;
use web_buttons::plugins::web_buttons::storage::{ButtonMode, ButtonRecord};

static OPENED: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(Vec::new()));

fn record_open(url: &str) -> std::io::Result<()> {
    OPENED.lock().unwrap().push(url.to_string());
    Ok(())
}

fn failing_open(_url: &str) -> std::io::Result<()> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"))
}

fn activator(preview_chars: usize) -> Activator {
    Activator::new(Duration::from_secs(5), preview_chars)
        .unwrap()
        .with_opener(record_open)
}

fn was_opened(url: &str) -> bool {
    OPENED.lock().unwrap().iter().any(|u| u == url)
}

#[test]
fn post_carries_body_headers_and_cookies() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/hook")
            .header("x-key", "secret")
            .header("cookie", "session=abc123; theme=dark")
            .body(r#"{"deploy":true}"#);
        then.status(201).body("queued");
    });

    let mut rec = ButtonRecord::new("deploy", &server.url("/hook"));
    rec.mode = ButtonMode::Quiet;
    rec.headers.insert("x-key".into(), "secret".into());
    rec.cookies.insert("session".into(), "abc123".into());
    rec.cookies.insert("theme".into(), "dark".into());
    rec.body = Some(r#"{"deploy":true}"#.into());

    let resp = activator(200).send(&rec).unwrap();
    m.assert();
    assert_eq!(resp.status, 201);
    assert_eq!(resp.body, "queued");
}

#[test]
fn quiet_mode_notifies_with_truncated_response() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET).path("/status");
        then.status(200).body("a".repeat(50));
    });

    let mut rec = ButtonRecord::new("status", &server.url("/status"));
    rec.mode = ButtonMode::Quiet;
    let report = activator(10).activate(&rec).unwrap();

    m.assert();
    assert!(!report.opened);
    assert_eq!(report.status, Some(200));
    assert_eq!(report.notification.title, "status: HTTP 200 OK");
    assert_eq!(report.notification.body, format!("{}…", "a".repeat(10)));
    assert!(!was_opened(&rec.url));
}

#[test]
fn quiet_mode_reports_empty_bodies() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ping");
        then.status(204);
    });
    let mut rec = ButtonRecord::new("ping", &server.url("/ping"));
    rec.mode = ButtonMode::Quiet;
    let report = activator(200).activate(&rec).unwrap();
    assert_eq!(report.status, Some(204));
    assert_eq!(report.notification.body, "(empty response)");
}

#[test]
fn quiet_mode_treats_error_statuses_as_responses() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404).body("nope");
    });
    let mut rec = ButtonRecord::new("missing", &server.url("/missing"));
    rec.mode = ButtonMode::Quiet;
    let report = activator(200).activate(&rec).unwrap();
    assert_eq!(report.notification.title, "missing: HTTP 404 Not Found");
    assert_eq!(report.notification.body, "nope");
}

#[test]
fn plain_browser_button_only_opens() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.path("/page");
        then.status(200);
    });
    let rec = ButtonRecord::new("page", &server.url("/page"));
    let report = activator(200).activate(&rec).unwrap();

    m.assert_hits(0);
    assert!(report.opened);
    assert_eq!(report.status, None);
    assert_eq!(report.notification.title, "Opened page");
    assert!(was_opened(&rec.url));
}

#[test]
fn browser_button_with_request_data_sends_then_opens() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET).path("/login").header("cookie", "sid=1");
        then.status(200).body("ok");
    });
    let mut rec = ButtonRecord::new("login", &server.url("/login"));
    rec.cookies.insert("sid".into(), "1".into());
    let report = activator(200).activate(&rec).unwrap();

    m.assert();
    assert!(report.opened);
    assert_eq!(report.status, Some(200));
    assert!(report.notification.body.ends_with("returned HTTP 200 OK"));
    assert!(was_opened(&rec.url));
}

#[test]
fn unreachable_host_is_a_network_error() {
    let mut rec = ButtonRecord::new("down", "http://127.0.0.1:1/");
    rec.mode = ButtonMode::Quiet;
    let err = activator(200).activate(&rec).unwrap_err();
    assert!(matches!(err, ButtonError::Network { .. }));
    assert_eq!(err.kind(), "Network error");
}

#[test]
fn browser_still_opens_when_request_fails() {
    let mut rec = ButtonRecord::new("flaky", "http://127.0.0.1:1/flaky");
    rec.body = Some("x".into());
    let report = activator(200).activate(&rec).unwrap();
    assert!(report.opened);
    assert_eq!(report.status, None);
    assert!(report.notification.body.starts_with("Request failed:"));
    assert!(was_opened("http://127.0.0.1:1/flaky"));
}

#[test]
fn browser_failure_is_reported() {
    let rec = ButtonRecord::new("x", "https://example.com");
    let act = Activator::new(Duration::from_secs(1), 200)
        .unwrap()
        .with_opener(failing_open);
    assert!(matches!(act.activate(&rec), Err(ButtonError::OpenBrowser { .. })));
    assert!(matches!(act.open_direct("https://example.com"), Err(ButtonError::OpenBrowser { .. })));
}

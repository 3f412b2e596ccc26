use crate::common::slug::generate_name;
use crate::plugins::web_buttons::error::ButtonError;
use crate::plugins::web_buttons::storage::{button_key, ButtonMap, ButtonMode, ButtonRecord};
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

/// Prefix a missing scheme with `https://` and check the result is an http(s) URL.
///
/// Returns the URL as the user wrote it (plus scheme) alongside the parsed form.
pub fn normalize_url(raw: &str) -> Result<(String, Url), ButtonError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ButtonError::invalid_url(raw, "the URL is empty"));
    }
    let text = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let parsed = Url::parse(&text).map_err(|e| ButtonError::invalid_url(raw, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ButtonError::invalid_url(raw, "only http and https are supported"));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ButtonError::invalid_url(raw, "the URL has no host"));
    }
    Ok((text, parsed))
}

pub fn find<'a>(buttons: &'a ButtonMap, name: &str) -> Result<&'a ButtonRecord, ButtonError> {
    buttons
        .get(&button_key(name))
        .ok_or_else(|| ButtonError::UnknownButton(name.to_string()))
}

fn find_mut<'a>(buttons: &'a mut ButtonMap, name: &str) -> Result<&'a mut ButtonRecord, ButtonError> {
    buttons
        .get_mut(&button_key(name))
        .ok_or_else(|| ButtonError::UnknownButton(name.to_string()))
}

/// Create a button. The name defaults to one derived from the URL.
pub fn add<'a>(
    buttons: &'a mut ButtonMap,
    url: &str,
    name: Option<&str>,
    overwrite: bool,
) -> Result<&'a ButtonRecord, ButtonError> {
    let (url, parsed) = normalize_url(url)?;
    let name = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => generate_name(&parsed),
    };
    let key = button_key(&name);
    if buttons.contains_key(&key) && !overwrite {
        return Err(ButtonError::DuplicateName(name));
    }
    tracing::info!(%name, %url, overwrite, "adding web button");
    buttons.insert(key.clone(), ButtonRecord::new(&name, &url));
    Ok(&buttons[&key])
}

/// Set a header, replacing any existing header of the same name regardless of case.
pub fn set_header(buttons: &mut ButtonMap, name: &str, header: &str, value: &str) -> Result<(), ButtonError> {
    let record = find_mut(buttons, name)?;
    let header = header.trim();
    HeaderName::from_bytes(header.as_bytes()).map_err(|_| ButtonError::InvalidHeader(header.to_string()))?;
    HeaderValue::from_str(value).map_err(|_| ButtonError::InvalidHeader(format!("{header}: {value}")))?;
    record.headers.retain(|k, _| !k.eq_ignore_ascii_case(header));
    record.headers.insert(header.to_string(), value.to_string());
    Ok(())
}

/// Parse `name=value; name2=value2`. Empty segments are skipped.
pub fn parse_cookies(spec: &str) -> Result<Vec<(String, String)>, ButtonError> {
    let mut cookies = Vec::new();
    for segment in spec.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (key, value) = segment
            .split_once('=')
            .ok_or_else(|| ButtonError::MalformedCookie(segment.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ButtonError::MalformedCookie(segment.to_string()));
        }
        cookies.push((key.to_string(), value.trim().to_string()));
    }
    if cookies.is_empty() {
        return Err(ButtonError::MalformedCookie(spec.to_string()));
    }
    Ok(cookies)
}

/// Merge cookies into a button. Nothing changes unless every segment parses.
pub fn add_cookies(buttons: &mut ButtonMap, name: &str, spec: &str) -> Result<usize, ButtonError> {
    let record = find_mut(buttons, name)?;
    let cookies = parse_cookies(spec)?;
    let count = cookies.len();
    record.cookies.extend(cookies);
    Ok(count)
}

pub fn set_body(buttons: &mut ButtonMap, name: &str, body: &str) -> Result<(), ButtonError> {
    let record = find_mut(buttons, name)?;
    record.body = Some(body.to_string());
    Ok(())
}

pub fn set_mode(buttons: &mut ButtonMap, name: &str, mode: &str) -> Result<ButtonMode, ButtonError> {
    let record = find_mut(buttons, name)?;
    let mode: ButtonMode = mode.parse()?;
    record.mode = mode;
    Ok(mode)
}

pub fn remove(buttons: &mut ButtonMap, name: &str) -> Result<ButtonRecord, ButtonError> {
    buttons
        .remove(&button_key(name))
        .ok_or_else(|| ButtonError::UnknownButton(name.to_string()))
}

/// Buttons whose name contains `filter` (case-insensitive), most recently used first.
pub fn list<'a>(buttons: &'a ButtonMap, filter: &str) -> Vec<&'a ButtonRecord> {
    let filter = filter.trim().to_lowercase();
    let mut matches: Vec<&ButtonRecord> = buttons
        .values()
        .filter(|b| filter.is_empty() || b.name.to_lowercase().contains(&filter))
        .collect();
    matches.sort_by(|a, b| {
        b.last_used
            .cmp(&a.last_used)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    matches
}

/// Stamp a button as just used. The stamp is kept ahead of every other
/// button so it sorts first even within the same millisecond.
pub fn mark_used(buttons: &mut ButtonMap, name: &str, now_ms: i64) -> Result<i64, ButtonError> {
    let key = button_key(name);
    let latest_other = buttons
        .iter()
        .filter(|(k, _)| **k != key)
        .map(|(_, b)| b.last_used)
        .max();
    let record = find_mut(buttons, name)?;
    let stamp = match latest_other {
        Some(latest) => now_ms.max(latest.saturating_add(1)),
        None => now_ms,
    };
    record.last_used = stamp;
    Ok(stamp)
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

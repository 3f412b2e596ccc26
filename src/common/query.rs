use once_cell::sync::Lazy;
use regex::Regex;

/// Loose "this could be typed as a URL" check used when nothing else matches.
static URLISH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?://\S+|www\.\S+|[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}(?::\d+)?(?:[/?#]\S*)?)$")
        .unwrap()
});

/// Split a query into tokens.
///
/// Whitespace separates tokens unless it sits inside matching single or double
/// quotes, in which case the quoted text (quotes stripped) becomes part of one
/// token. A backslash escapes the next character. An unmatched quote runs to the
/// end of the input.
pub fn tokenize_query(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escape = false;
    let mut quoted = false;

    for ch in input.chars() {
        if escape {
            current.push(ch);
            escape = false;
            continue;
        }

        if ch == '\\' {
            escape = true;
            continue;
        }

        if let Some(active) = quote {
            if ch == active {
                quote = None;
            } else {
                current.push(ch);
            }
            continue;
        }

        if ch == '"' || ch == '\'' {
            quote = Some(ch);
            quoted = true;
            continue;
        }

        if ch.is_whitespace() {
            if !current.is_empty() || quoted {
                tokens.push(std::mem::take(&mut current));
            }
            quoted = false;
        } else {
            current.push(ch);
        }
    }

    if escape {
        current.push('\\');
    }

    if !current.is_empty() || quoted {
        tokens.push(current);
    }

    tokens
}

/// Join tokens back into a query that [`tokenize_query`] splits into the same tokens.
pub fn rebuild_query<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|token| {
            let token = token.as_ref();
            let needs_quotes = token.is_empty()
                || token
                    .chars()
                    .any(|c| c.is_whitespace() || c == '"' || c == '\'' || c == '\\');
            if needs_quotes {
                let mut escaped = String::with_capacity(token.len() + 2);
                escaped.push('"');
                for ch in token.chars() {
                    if ch == '\\' || ch == '"' {
                        escaped.push('\\');
                    }
                    escaped.push(ch);
                }
                escaped.push('"');
                escaped
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Returns true when `text` is an absolute `http`/`https` URL with a host.
pub fn is_http_url(text: &str) -> bool {
    match url::Url::parse(text) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Heuristic used to offer "open"/"add" for text like `github.com`.
pub fn looks_like_url(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && URLISH.is_match(text)
}

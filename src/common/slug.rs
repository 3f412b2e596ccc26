use url::{Host, Url};

/// Fallback when a host produces no usable characters.
pub const FALLBACK_NAME: &str = "button";

/// Second-level labels that are registered under a country code TLD
/// (`example.co.uk`, `example.com.au`, ...).
const SECOND_LEVEL: &[&str] = &["ac", "co", "com", "edu", "gov", "net", "or", "org"];

/// Lower-case `text` and replace every character outside `[a-z0-9_-]` with `-`.
pub fn slugify(text: &str) -> String {
    let slug: String = text
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .map(|c| match c {
            c if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' => c,
            _ => '-',
        })
        .collect();
    if slug.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        slug
    }
}

/// Derive a default button name from a URL.
///
/// The leading `www.` and the public suffix are removed from the host, so
/// `https://www.github.com` becomes `github` and `https://api.example.co.uk`
/// becomes `api-example`. IP addresses and single-label hosts are used whole.
pub fn generate_name(url: &Url) -> String {
    let host = match url.host() {
        Some(Host::Domain(d)) => d.to_ascii_lowercase(),
        Some(Host::Ipv4(ip)) => return slugify(&ip.to_string()),
        Some(Host::Ipv6(ip)) => return slugify(&ip.to_string()),
        None => return FALLBACK_NAME.to_string(),
    };
    let host = host.trim_end_matches('.');
    let host = host.strip_prefix("www.").unwrap_or(host);
    slugify(strip_public_suffix(host))
}

fn strip_public_suffix(host: &str) -> &str {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return host;
    }
    let tld = labels[labels.len() - 1];
    let second = labels[labels.len() - 2];
    let suffix_labels = if labels.len() > 2 && tld.len() == 2 && SECOND_LEVEL.contains(&second) {
        2
    } else {
        1
    };
    let keep = labels.len() - suffix_labels;
    let cut = labels[..keep].iter().map(|l| l.len()).sum::<usize>() + keep - 1;
    &host[..cut]
}

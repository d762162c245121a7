//! Link URL Rules
//!
//! Coercion and validation applied when a link is created, edited or imported.

use url::Url;

/// Scheme assumed for a bare host such as `example.com`
const DEFAULT_SCHEME: &str = "https://";

fn has_scheme(raw: &str) -> bool {
    let Some((scheme, _)) = raw.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Normalize user or file supplied URL text.
///
/// Trims, prefixes `https://` when no scheme is present and checks the result
/// parses as an absolute URL with a host. Returns `None` for empty input,
/// unparseable input, or anything longer than `max_chars`.
pub fn normalize_url(raw: &str, max_chars: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, trimmed)
    };

    if candidate.chars().count() > max_chars {
        return None;
    }

    let parsed = Url::parse(&candidate).ok()?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Some(candidate),
        _ => None,
    }
}

/// Hostname of `url` without a leading `www.`, used as a fallback title
pub fn host_title(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Trim and cap to `max_chars` characters
pub fn bounded_title(raw: &str, max_chars: usize) -> String {
    raw.trim().chars().take(max_chars).collect()
}

/// Title for a link: the trimmed, bounded title, or the host when blank
pub fn link_title(raw_title: &str, url: &str, max_chars: usize) -> String {
    let title = bounded_title(raw_title, max_chars);
    if !title.is_empty() {
        return title;
    }
    host_title(url)
        .map(|host| bounded_title(&host, max_chars))
        .unwrap_or_else(|| bounded_title(url, max_chars))
}

//! Pure URL tagging helpers.

use serde::Serialize;
use url::Url;

/// Normalizes free text into a UTM-safe token.
///
/// Lowercases, turns each whitespace run into a single `_` and drops every
/// character outside `[a-z0-9_-]`.
pub fn sanitize_utm_value(value: &str) -> String {
    let lowered = value.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_space = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
                in_space = true;
            }
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
            out.push(c);
        }
    }
    out
}

/// True when `url` parses as an absolute `http`/`https` URL with a host.
pub fn is_valid_base_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    matches!(parsed.scheme(), "http" | "https")
        && parsed.host_str().is_some_and(|host| !host.is_empty())
}

/// Raw UTM field values as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtmParams {
    pub source: String,
    pub medium: String,
    pub campaign: String,
    pub content: String,
    pub term: String,
}

/// A tagged URL and the parameters it carries, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedUrl {
    pub url: String,
    pub breakdown: Vec<(String, String)>,
}

impl GeneratedUrl {
    /// True when no UTM parameter was appended.
    pub fn is_untagged(&self) -> bool {
        self.breakdown.is_empty()
    }
}

/// The `(key, value)` pairs for `params`, in canonical order.
///
/// A field is omitted when its trimmed input is empty. Source and medium
/// are taken as-is; the free-text fields are sanitized, so input made only
/// of dropped characters still yields an empty value.
pub fn utm_pairs(params: &UtmParams) -> Vec<(String, String)> {
    let fields = [
        ("utm_source", params.source.trim(), false),
        ("utm_medium", params.medium.trim(), false),
        ("utm_campaign", params.campaign.trim(), true),
        ("utm_content", params.content.trim(), true),
        ("utm_term", params.term.trim(), true),
    ];
    fields
        .into_iter()
        .filter(|(_, value, _)| !value.is_empty())
        .map(|(key, value, free_text)| {
            let value = if free_text {
                sanitize_utm_value(value)
            } else {
                value.to_string()
            };
            (key.to_string(), value)
        })
        .collect()
}

/// Appends the UTM query parameters to `base`.
///
/// Uses `&` when `base` already carries a query string. With every field
/// empty the trimmed base is returned unchanged.
pub fn build_utm_url(base: &str, params: &UtmParams) -> String {
    tag(base, params).url
}

pub(crate) fn tag(base: &str, params: &UtmParams) -> GeneratedUrl {
    let base = base.trim();
    let breakdown = utm_pairs(params);
    if breakdown.is_empty() {
        return GeneratedUrl {
            url: base.to_string(),
            breakdown,
        };
    }

    let query = breakdown
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if base.contains('?') { '&' } else { '?' };
    GeneratedUrl {
        url: format!("{base}{separator}{query}"),
        breakdown,
    }
}

//! Content-Type matching for request bodies.
//!
//! Only the media-type directive of a `Content-Type` header takes part in
//! matching; parameters such as `charset` are ignored.

use std::fmt;

/// Media type for JSON bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// Media type for plain-text bodies.
pub const TEXT_PLAIN: &str = "text/plain";

/// One accepted media type of a body binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaTypeRule {
    /// Matches exactly this media type (case-sensitive).
    Named(String),
    /// Matches a request without a `Content-Type` header.
    Omitted,
}

impl MediaTypeRule {
    /// Whether this rule accepts the given media type.
    pub fn matches(&self, media_type: Option<&str>) -> bool {
        match (self, media_type) {
            (MediaTypeRule::Named(expected), Some(actual)) => expected == actual,
            (MediaTypeRule::Omitted, None) => true,
            _ => false,
        }
    }
}

impl fmt::Display for MediaTypeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaTypeRule::Named(name) => f.write_str(name),
            MediaTypeRule::Omitted => f.write_str("<no Content-Type>"),
        }
    }
}

impl From<&str> for MediaTypeRule {
    fn from(value: &str) -> Self {
        MediaTypeRule::Named(value.to_string())
    }
}

impl From<String> for MediaTypeRule {
    fn from(value: String) -> Self {
        MediaTypeRule::Named(value)
    }
}

impl From<Option<&str>> for MediaTypeRule {
    fn from(value: Option<&str>) -> Self {
        value.map_or(MediaTypeRule::Omitted, MediaTypeRule::from)
    }
}

/// Decides whether a request body is parsed as JSON before it is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonPolicy {
    /// Always (`true`) or never (`false`) parse.
    Flag(bool),
    /// Parse only when the request media type matches one of these rules.
    MediaTypes(Vec<MediaTypeRule>),
}

impl Default for JsonPolicy {
    fn default() -> Self {
        JsonPolicy::MediaTypes(vec![
            MediaTypeRule::from(APPLICATION_JSON),
            MediaTypeRule::Omitted,
        ])
    }
}

impl From<bool> for JsonPolicy {
    fn from(value: bool) -> Self {
        JsonPolicy::Flag(value)
    }
}

impl From<&str> for JsonPolicy {
    fn from(value: &str) -> Self {
        JsonPolicy::MediaTypes(vec![MediaTypeRule::from(value)])
    }
}

impl From<Vec<MediaTypeRule>> for JsonPolicy {
    fn from(value: Vec<MediaTypeRule>) -> Self {
        JsonPolicy::MediaTypes(value)
    }
}

impl From<&[&str]> for JsonPolicy {
    fn from(value: &[&str]) -> Self {
        JsonPolicy::MediaTypes(value.iter().copied().map(MediaTypeRule::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for JsonPolicy {
    fn from(value: [&str; N]) -> Self {
        JsonPolicy::from(&value[..])
    }
}

/// Return the media-type directive of a `Content-Type` header value.
///
/// Everything after the first `;` is dropped and the rest is trimmed. A
/// missing or blank header yields `None`.
///
/// ```
/// use lambdakit::extract_media_type;
///
/// assert_eq!(
///     extract_media_type(Some("application/json; charset=utf-8")),
///     Some("application/json")
/// );
/// assert_eq!(extract_media_type(Some("")), None);
/// ```
pub fn extract_media_type(header: Option<&str>) -> Option<&str> {
    let directive = header?.split(';').next()?.trim();
    if directive.is_empty() {
        None
    } else {
        Some(directive)
    }
}

/// Whether any of the `allowed` rules accepts `media_type`.
pub fn is_supported(allowed: &[MediaTypeRule], media_type: Option<&str>) -> bool {
    allowed.iter().any(|rule| rule.matches(media_type))
}

/// Whether a body with `media_type` should be parsed as JSON under `policy`.
///
/// Without a policy, JSON is parsed for `application/json` and for requests
/// that carry no `Content-Type` header.
pub fn should_parse_json(policy: Option<&JsonPolicy>, media_type: Option<&str>) -> bool {
    match policy {
        Some(JsonPolicy::Flag(flag)) => *flag,
        Some(JsonPolicy::MediaTypes(rules)) => is_supported(rules, media_type),
        None => should_parse_json(Some(&JsonPolicy::default()), media_type),
    }
}

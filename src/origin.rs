//! Request-origin metadata and detail redaction
//!
//! The log never parses HTTP itself; handlers pass raw header values and the
//! peer address, and this module normalizes them into a `RequestOrigin`.

use serde::{Deserialize, Serialize};

/// Placeholder for origin fields that could not be determined
pub const UNKNOWN: &str = "unknown";

/// Replacement value for redacted detail fields
pub const REDACTED: &str = "[REDACTED]";

/// Key words naming secret material, matched against the last segment of a key
const SENSITIVE_WORDS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "authorization",
    "cookie",
    "apikey",
    "cvv",
];

/// Two-segment key endings naming secret material
const SENSITIVE_PAIRS: &[(&str, &str)] = &[
    ("api", "key"),
    ("credit", "card"),
    ("card", "number"),
];

/// Network origin and client identifier of the request behind an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOrigin {
    pub source_address: String,
    pub agent_string: String,
}

impl Default for RequestOrigin {
    fn default() -> Self {
        Self {
            source_address: UNKNOWN.to_string(),
            agent_string: UNKNOWN.to_string(),
        }
    }
}

impl RequestOrigin {
    /// Origin from already-resolved values; empty values become "unknown"
    pub fn new(source_address: impl Into<String>, agent_string: impl Into<String>) -> Self {
        Self {
            source_address: or_unknown(Some(source_address.into().as_str())),
            agent_string: or_unknown(Some(agent_string.into().as_str())),
        }
    }

    /// Origin from raw request parts
    ///
    /// The source address is the first entry of the forwarded-for header,
    /// then the socket peer address, then "unknown".
    pub fn from_request_parts(
        forwarded_for: Option<&str>,
        remote_addr: Option<&str>,
        user_agent: Option<&str>,
    ) -> Self {
        let forwarded = forwarded_for
            .and_then(|header| header.split(',').next())
            .map(str::trim)
            .filter(|addr| !addr.is_empty());

        let source_address = match forwarded {
            Some(addr) => addr.to_string(),
            None => or_unknown(remote_addr),
        };

        Self {
            source_address,
            agent_string: or_unknown(user_agent),
        }
    }
}

pub(crate) fn or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Whether a detail key names secret material
///
/// Keys are split into words at `_`, `-`, `.` and camelCase boundaries; the
/// key is sensitive when its final word (or final two words) name a secret.
/// `sessionToken` and `api_key` match, `tokenTtl` does not.
pub fn is_sensitive_key(key: &str) -> bool {
    let words = key_words(key);
    match words.as_slice() {
        [] => false,
        [.., last] if SENSITIVE_WORDS.contains(&last.as_str()) => true,
        [.., first, last] => SENSITIVE_PAIRS
            .iter()
            .any(|&(a, b)| first == a && last == b),
        _ => false,
    }
}

fn key_words(key: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in key.chars() {
        if matches!(ch, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Replace the values of secret-looking keys, recursively
pub fn redact_detail(detail: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match detail {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    if is_sensitive_key(&key) {
                        (key, Value::String(REDACTED.to_string()))
                    } else {
                        (key, redact_detail(value))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact_detail).collect()),
        other => other,
    }
}

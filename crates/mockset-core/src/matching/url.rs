//! URL pattern matching for registered endpoints.

use regex::Regex;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Request-matching criterion for one endpoint: an exact URL or a regex.
///
/// Exact patterns compare after normalization (query string stripped,
/// trailing-slash insensitive). Regex patterns match the raw URL.
#[derive(Debug, Clone)]
pub enum UrlPattern {
    Exact(String),
    Regex(Regex),
}

impl UrlPattern {
    pub fn exact(url: impl Into<String>) -> Self {
        UrlPattern::Exact(url.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(UrlPattern::Regex(Regex::new(pattern)?))
    }

    /// Check whether a request URL matches this pattern.
    pub fn matches(&self, url: &str) -> bool {
        match self {
            UrlPattern::Exact(pattern) => normalize_url(pattern) == normalize_url(url),
            UrlPattern::Regex(regex) => regex.is_match(url),
        }
    }

    /// The pattern source text, for diagnostics and identity checks.
    pub fn as_str(&self) -> &str {
        match self {
            UrlPattern::Exact(url) => url,
            UrlPattern::Regex(regex) => regex.as_str(),
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlPattern::Exact(url) => f.write_str(url),
            UrlPattern::Regex(regex) => write!(f, "regex:{}", regex.as_str()),
        }
    }
}

// Two patterns are equal when they are the same kind built from the same
// source text. `Regex` itself has no equality.
impl PartialEq for UrlPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (UrlPattern::Exact(a), UrlPattern::Exact(b)) => a == b,
            (UrlPattern::Regex(a), UrlPattern::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for UrlPattern {}

impl Serialize for UrlPattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            UrlPattern::Exact(url) => url.serialize(serializer),
            UrlPattern::Regex(regex) => {
                let mut map = serde_json::Map::new();
                map.insert("regex".to_string(), Value::String(regex.as_str().into()));
                Value::Object(map).serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for UrlPattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::String(url) => Ok(UrlPattern::Exact(url)),
            Value::Object(map) => {
                let pattern = map
                    .get("regex")
                    .and_then(Value::as_str)
                    .ok_or_else(|| D::Error::custom("Url object must have a 'regex' key"))?;
                UrlPattern::regex(pattern)
                    .map_err(|e| D::Error::custom(format!("Invalid url regex: {e}")))
            }
            _ => Err(D::Error::custom(
                "Url must be either a string or a {regex: ...} object",
            )),
        }
    }
}

fn normalize_url(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or("");
    let trimmed = without_query.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".into()
    } else {
        trimmed.into()
    }
}

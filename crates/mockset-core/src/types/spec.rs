//! Response spec: declarative descriptor of one mocked endpoint.

use crate::matching::url::UrlPattern;
use crate::types::method::HttpMethod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Simulated transport failure raised instead of answering a request.
///
/// Unit variants serialize as plain strings (`"timeout"`), `Custom` as a
/// `{"custom": "..."}` object, so failures can be declared in config files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TransportError {
    Timeout,
    ConnectionReset,
    Custom(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => f.write_str("request timed out"),
            TransportError::ConnectionReset => f.write_str("connection reset"),
            TransportError::Custom(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for TransportError {}

/// Effective response payload of a spec, one of the mutually exclusive kinds.
///
/// Priority when several fields are set: failure > JSON > text > empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<'a> {
    Failure(&'a TransportError),
    Json(&'a Value),
    Text(&'a str),
    Empty,
}

/// Descriptor of one mocked endpoint: matching criteria plus the canned
/// response to serve. Immutable after construction; built directly or from
/// an [`EndpointTemplate`](crate::types::template::EndpointTemplate).
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    name: String,
    url: UrlPattern,
    method: HttpMethod,
    status: Option<u16>,
    json: Option<Value>,
    text: Option<String>,
    failure: Option<TransportError>,
    extra: BTreeMap<String, Value>,
}

impl ResponseSpec {
    /// Create a spec with an explicit endpoint name and no payload yet.
    pub fn new(name: impl Into<String>, url: UrlPattern, method: HttpMethod) -> Self {
        Self {
            name: name.into(),
            url,
            method,
            status: None,
            json: None,
            text: None,
            failure: None,
            extra: BTreeMap::new(),
        }
    }

    /// Create a spec whose name is derived from its method and URL
    /// (`"POST https://example.com/api/push"`).
    pub fn unnamed(url: UrlPattern, method: HttpMethod) -> Self {
        let name = format!("{} {}", method, url);
        Self::new(name, url, method)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_failure(mut self, failure: TransportError) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub(crate) fn from_parts(
        name: String,
        url: UrlPattern,
        method: HttpMethod,
        status: Option<u16>,
        json: Option<Value>,
        text: Option<String>,
        failure: Option<TransportError>,
        extra: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            name,
            url,
            method,
            status,
            json,
            text,
            failure,
            extra,
        }
    }

    /// Endpoint name, the lookup key inside a
    /// [`MockSet`](crate::mocks::collection::MockSet).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &UrlPattern {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Status code to register; `200` when the spec does not set one.
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn failure(&self) -> Option<&TransportError> {
        self.failure.as_ref()
    }

    /// Free-form extra parameters carried alongside the spec.
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    /// Resolve the effective payload: failure > JSON > text > empty.
    pub fn payload(&self) -> Payload<'_> {
        if let Some(failure) = &self.failure {
            Payload::Failure(failure)
        } else if let Some(json) = &self.json {
            Payload::Json(json)
        } else if let Some(text) = &self.text {
            Payload::Text(text)
        } else {
            Payload::Empty
        }
    }
}

impl fmt::Display for ResponseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({} {} -> {})",
            self.name,
            self.method,
            self.url,
            self.status()
        )
    }
}

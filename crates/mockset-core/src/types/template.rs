//! Endpoint templates: default configurations for building response specs.
//!
//! A template plays the role a pre-configured endpoint definition plays in a
//! test suite: it carries the URL, method, and default payload for one named
//! endpoint, and stamps out [`ResponseSpec`] instances on demand. Defaults are
//! deep-cloned into every built spec, so overriding one spec can never leak
//! into the next one built from the same template.

use crate::matching::url::UrlPattern;
use crate::types::method::HttpMethod;
use crate::types::spec::{ResponseSpec, TransportError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Default configuration for one named endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointTemplate {
    /// Endpoint identifier, used as the lookup key for built specs
    pub name: String,
    /// URL pattern requests must match
    pub url: UrlPattern,
    /// HTTP method requests must use
    pub method: HttpMethod,
    /// Default status code for the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Default JSON response body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    /// Default text response body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Default transport failure raised instead of responding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<TransportError>,
}

impl EndpointTemplate {
    pub fn new(name: impl Into<String>, url: UrlPattern, method: HttpMethod) -> Self {
        Self {
            name: name.into(),
            url,
            method,
            status: None,
            json: None,
            text: None,
            failure: None,
        }
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

    /// Build a spec carrying this template's defaults unchanged.
    pub fn spec(&self) -> ResponseSpec {
        ResponseSpec::from_parts(
            self.name.clone(),
            self.url.clone(),
            self.method,
            self.status,
            self.json.clone(),
            self.text.clone(),
            self.failure.clone(),
            BTreeMap::new(),
        )
    }

    /// Build a spec from this template with per-instance overrides applied.
    ///
    /// Every override field falls back to the template default when absent.
    /// A partial-JSON override is merged key-by-key into a clone of the
    /// template's default JSON; the template itself is never touched.
    pub fn build(&self, overrides: SpecOverrides) -> Result<ResponseSpec, SpecError> {
        if overrides.json.is_some() && overrides.partial_json.is_some() {
            // The partial map is defined against the template default only;
            // combining it with a full replacement body is ambiguous.
            return Err(SpecError::AmbiguousJson {
                endpoint: self.name.clone(),
            });
        }

        let status = overrides.status.or(self.status);
        if let Some(code) = status {
            if !(100..=599).contains(&code) {
                return Err(SpecError::InvalidStatus {
                    endpoint: self.name.clone(),
                    status: code,
                });
            }
        }

        let json = match (overrides.json, overrides.partial_json) {
            (Some(json), None) => Some(json),
            (None, Some(partial)) => Some(self.merge_partial(partial)?),
            (None, None) => self.json.clone(),
            (Some(_), Some(_)) => unreachable!("rejected above"),
        };

        Ok(ResponseSpec::from_parts(
            overrides.name.unwrap_or_else(|| self.name.clone()),
            overrides.url.unwrap_or_else(|| self.url.clone()),
            overrides.method.unwrap_or(self.method),
            status,
            json,
            overrides.text.or_else(|| self.text.clone()),
            overrides.failure.or_else(|| self.failure.clone()),
            overrides.extra,
        ))
    }

    fn merge_partial(&self, partial: Map<String, Value>) -> Result<Value, SpecError> {
        let Some(Value::Object(default)) = &self.json else {
            return Err(SpecError::PartialWithoutDefault {
                endpoint: self.name.clone(),
            });
        };
        let mut merged = default.clone();
        for (key, value) in partial {
            merged.insert(key, value);
        }
        Ok(Value::Object(merged))
    }
}

/// Per-instance overrides for [`EndpointTemplate::build`].
///
/// All fields are optional; setters chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecOverrides {
    name: Option<String>,
    url: Option<UrlPattern>,
    method: Option<HttpMethod>,
    status: Option<u16>,
    json: Option<Value>,
    partial_json: Option<Map<String, Value>>,
    text: Option<String>,
    failure: Option<TransportError>,
    extra: BTreeMap<String, Value>,
}

impl SpecOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn url(mut self, url: UrlPattern) -> Self {
        self.url = Some(url);
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Replace the template's JSON body wholesale.
    pub fn json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    /// Merge the given keys into a copy of the template's default JSON body.
    pub fn partial_json(mut self, partial: Map<String, Value>) -> Self {
        self.partial_json = Some(partial);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn failure(mut self, failure: TransportError) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Errors building a spec from a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// Both a full JSON body and a partial-JSON map were supplied
    AmbiguousJson { endpoint: String },
    /// Partial JSON given but the template has no object-valued default
    PartialWithoutDefault { endpoint: String },
    /// Status code outside 100-599
    InvalidStatus { endpoint: String, status: u16 },
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::AmbiguousJson { endpoint } => {
                write!(
                    f,
                    "Endpoint '{}': cannot combine a full json body with partial_json; \
                     partial_json applies to the template default only",
                    endpoint
                )
            }
            SpecError::PartialWithoutDefault { endpoint } => {
                write!(
                    f,
                    "Endpoint '{}': partial_json requires an object-valued default json body",
                    endpoint
                )
            }
            SpecError::InvalidStatus { endpoint, status } => {
                write!(
                    f,
                    "Endpoint '{}': status code {} is outside 100-599",
                    endpoint, status
                )
            }
        }
    }
}

impl std::error::Error for SpecError {}

/// Name-indexed store of endpoint templates.
///
/// Fillable programmatically or from config files via
/// [`load_registry`](crate::config::parser::load_registry).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateRegistry {
    templates: HashMap<String, EndpointTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a template, returning the previous one under the same name.
    pub fn insert(&mut self, template: EndpointTemplate) -> Option<EndpointTemplate> {
        self.templates.insert(template.name.clone(), template)
    }

    pub fn get(&self, name: &str) -> Option<&EndpointTemplate> {
        self.templates.get(name)
    }

    /// Build a default spec for the named endpoint, if registered.
    pub fn spec(&self, name: &str) -> Option<ResponseSpec> {
        self.templates.get(name).map(EndpointTemplate::spec)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Registered endpoint names, sorted for stable diagnostics.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

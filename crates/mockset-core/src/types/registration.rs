//! Registration descriptors handed to an interception backend.
//!
//! Specs sharing one (url, method) endpoint collapse into a single
//! descriptor whose response list the backend serves in declaration order,
//! one per request, repeating the last entry once exhausted.

use crate::matching::url::UrlPattern;
use crate::types::method::HttpMethod;
use crate::types::spec::{Payload, ResponseSpec, TransportError};
use serde_json::Value;

/// Response body kind registered with the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Json(Value),
    Text(String),
    Empty,
}

/// What the backend does when a registered endpoint is hit: answer with a
/// status/body pair, or fail the request with a transport error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    Reply { status: u16, body: Body },
    Failure(TransportError),
}

impl ResponseOutcome {
    /// Derive the outcome a spec registers, applying the payload priority.
    pub fn from_spec(spec: &ResponseSpec) -> Self {
        match spec.payload() {
            Payload::Failure(failure) => ResponseOutcome::Failure(failure.clone()),
            Payload::Json(json) => ResponseOutcome::Reply {
                status: spec.status(),
                body: Body::Json(json.clone()),
            },
            Payload::Text(text) => ResponseOutcome::Reply {
                status: spec.status(),
                body: Body::Text(text.to_string()),
            },
            Payload::Empty => ResponseOutcome::Reply {
                status: spec.status(),
                body: Body::Empty,
            },
        }
    }
}

/// One backend registration: an endpoint plus its ordered responses.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationDescriptor {
    /// URL pattern requests must match
    pub url: UrlPattern,
    /// HTTP method requests must use
    pub method: HttpMethod,
    /// Names of the specs this registration serves, in declaration order
    pub endpoints: Vec<String>,
    /// Responses served in order, last one repeating
    pub responses: Vec<ResponseOutcome>,
}

/// Group specs by (url, method) into registration descriptors.
///
/// Descriptor order follows the first appearance of each endpoint;
/// within a descriptor, responses keep the specs' declaration order.
pub fn group_by_endpoint(specs: &[ResponseSpec]) -> Vec<RegistrationDescriptor> {
    let mut descriptors: Vec<RegistrationDescriptor> = Vec::new();

    for spec in specs {
        let outcome = ResponseOutcome::from_spec(spec);
        let existing = descriptors
            .iter_mut()
            .find(|d| d.url == *spec.url() && d.method == spec.method());

        match existing {
            Some(descriptor) => {
                descriptor.endpoints.push(spec.name().to_string());
                descriptor.responses.push(outcome);
            }
            None => descriptors.push(RegistrationDescriptor {
                url: spec.url().clone(),
                method: spec.method(),
                endpoints: vec![spec.name().to_string()],
                responses: vec![outcome],
            }),
        }
    }

    descriptors
}

//! Interception backends: where registration descriptors land.
//!
//! [`InterceptBackend`] is the seam between the spec bookkeeping and
//! whatever library actually intercepts HTTP traffic in a test suite. Two
//! in-memory reference implementations ship with the crate:
//! - [`EagerBackend`]: matcher state exists from registration time, so an
//!   endpoint is observable before any request is made.
//! - [`DeferredBackend`]: registrations are stored untouched; nothing is
//!   observable until a request is actually dispatched.
//!
//! Both serve responses in registration order and repeat the last one when
//! the list is exhausted. State is single-threaded; cursors and request
//! logs use `Cell`/`RefCell` so dispatch works through `&self`.

use crate::matching::url::UrlPattern;
use crate::types::method::HttpMethod;
use crate::types::registration::{Body, RegistrationDescriptor, ResponseOutcome};
use crate::types::spec::TransportError;
use std::cell::{Cell, RefCell};
use std::fmt;

/// A request observed by a backend during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
}

/// A response produced by a backend for a matched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub body: Body,
}

/// Errors a backend can raise while accepting a registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend already holds a registration for this (method, url)
    AlreadyRegistered { method: HttpMethod, url: String },
    /// A registration with no responses to serve
    EmptyRegistration { url: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::AlreadyRegistered { method, url } => {
                write!(f, "Endpoint already registered: {} {}", method, url)
            }
            BackendError::EmptyRegistration { url } => {
                write!(f, "Registration for {} has no responses", url)
            }
        }
    }
}

impl std::error::Error for BackendError {}

/// Errors raised when dispatching a simulated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No registration matched the request
    NoMatch { method: HttpMethod, url: String },
    /// The matched registration simulates a transport failure
    Failure(TransportError),
    /// Dispatch attempted on a collection built without a backend
    NoBackend,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NoMatch { method, url } => {
                write!(f, "No registered endpoint matches {} {}", method, url)
            }
            DispatchError::Failure(failure) => {
                write!(f, "Simulated transport failure: {}", failure)
            }
            DispatchError::NoBackend => f.write_str("No interception backend attached"),
        }
    }
}

impl std::error::Error for DispatchError {}

/// One polymorphic capability: register a response descriptor, and later
/// report the request that matched a named endpoint, if any.
pub trait InterceptBackend {
    /// Accept a registration. Rejections propagate to the caller verbatim.
    fn register(&mut self, descriptor: &RegistrationDescriptor) -> Result<(), BackendError>;

    /// Dispatch a simulated request against the registered endpoints.
    fn intercept(&self, method: HttpMethod, url: &str) -> Result<MockResponse, DispatchError>;

    /// The most recent request that hit the named endpoint, if any.
    fn request_for(&self, endpoint: &str) -> Option<RecordedRequest>;
}

fn nth_outcome(responses: &[ResponseOutcome], cursor: &Cell<usize>) -> ResponseOutcome {
    let position = cursor.get().min(responses.len() - 1);
    cursor.set(cursor.get() + 1);
    responses[position].clone()
}

fn outcome_to_result(outcome: ResponseOutcome) -> Result<MockResponse, DispatchError> {
    match outcome {
        ResponseOutcome::Reply { status, body } => Ok(MockResponse { status, body }),
        ResponseOutcome::Failure(failure) => Err(DispatchError::Failure(failure)),
    }
}

struct Matcher {
    url: UrlPattern,
    method: HttpMethod,
    endpoints: Vec<String>,
    responses: Vec<ResponseOutcome>,
    cursor: Cell<usize>,
    hits: RefCell<Vec<RecordedRequest>>,
}

/// Backend that materializes matcher state at registration time.
///
/// Mirrors interception libraries that build adapter matchers up front: an
/// endpoint is known (with zero hits) the moment it is registered, and a
/// second registration for the same (method, url) is rejected.
#[derive(Default)]
pub struct EagerBackend {
    matchers: Vec<Matcher>,
}

impl EagerBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests the named endpoint's matcher has served.
    ///
    /// `Some(0)` as soon as the endpoint is registered; `None` for names
    /// no matcher serves.
    pub fn call_count(&self, endpoint: &str) -> Option<usize> {
        self.matchers
            .iter()
            .find(|m| m.endpoints.iter().any(|e| e == endpoint))
            .map(|m| m.hits.borrow().len())
    }
}

impl InterceptBackend for EagerBackend {
    fn register(&mut self, descriptor: &RegistrationDescriptor) -> Result<(), BackendError> {
        if descriptor.responses.is_empty() {
            return Err(BackendError::EmptyRegistration {
                url: descriptor.url.to_string(),
            });
        }
        if self
            .matchers
            .iter()
            .any(|m| m.url == descriptor.url && m.method == descriptor.method)
        {
            return Err(BackendError::AlreadyRegistered {
                method: descriptor.method,
                url: descriptor.url.to_string(),
            });
        }

        self.matchers.push(Matcher {
            url: descriptor.url.clone(),
            method: descriptor.method,
            endpoints: descriptor.endpoints.clone(),
            responses: descriptor.responses.clone(),
            cursor: Cell::new(0),
            hits: RefCell::new(Vec::new()),
        });
        Ok(())
    }

    fn intercept(&self, method: HttpMethod, url: &str) -> Result<MockResponse, DispatchError> {
        let matcher = self
            .matchers
            .iter()
            .find(|m| m.method == method && m.url.matches(url))
            .ok_or_else(|| DispatchError::NoMatch {
                method,
                url: url.to_string(),
            })?;

        matcher.hits.borrow_mut().push(RecordedRequest {
            method,
            url: url.to_string(),
        });
        outcome_to_result(nth_outcome(&matcher.responses, &matcher.cursor))
    }

    fn request_for(&self, endpoint: &str) -> Option<RecordedRequest> {
        self.matchers
            .iter()
            .find(|m| m.endpoints.iter().any(|e| e == endpoint))
            .and_then(|m| m.hits.borrow().last().cloned())
    }
}

struct Registration {
    descriptor: RegistrationDescriptor,
    cursor: Cell<usize>,
}

/// Backend that defers all observable state to execution time.
///
/// Mirrors interception libraries that only materialize requests when the
/// client actually calls: registration stores the descriptor untouched, and
/// `request_for` scans the request log recorded during dispatch.
#[derive(Default)]
pub struct DeferredBackend {
    registrations: Vec<Registration>,
    log: RefCell<Vec<RecordedRequest>>,
}

impl DeferredBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request dispatched so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.borrow().clone()
    }
}

impl InterceptBackend for DeferredBackend {
    fn register(&mut self, descriptor: &RegistrationDescriptor) -> Result<(), BackendError> {
        if descriptor.responses.is_empty() {
            return Err(BackendError::EmptyRegistration {
                url: descriptor.url.to_string(),
            });
        }
        self.registrations.push(Registration {
            descriptor: descriptor.clone(),
            cursor: Cell::new(0),
        });
        Ok(())
    }

    fn intercept(&self, method: HttpMethod, url: &str) -> Result<MockResponse, DispatchError> {
        let registration = self
            .registrations
            .iter()
            .find(|r| r.descriptor.method == method && r.descriptor.url.matches(url))
            .ok_or_else(|| DispatchError::NoMatch {
                method,
                url: url.to_string(),
            })?;

        self.log.borrow_mut().push(RecordedRequest {
            method,
            url: url.to_string(),
        });
        outcome_to_result(nth_outcome(
            &registration.descriptor.responses,
            &registration.cursor,
        ))
    }

    fn request_for(&self, endpoint: &str) -> Option<RecordedRequest> {
        let registration = self
            .registrations
            .iter()
            .find(|r| r.descriptor.endpoints.iter().any(|e| e == endpoint))?;

        self.log
            .borrow()
            .iter()
            .rev()
            .find(|request| {
                request.method == registration.descriptor.method
                    && registration.descriptor.url.matches(&request.url)
            })
            .cloned()
    }
}

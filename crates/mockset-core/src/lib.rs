//! mockset-core: canned HTTP response registry for test fixtures.
//!
//! Test setup declares [`ResponseSpec`]s (directly or via
//! [`EndpointTemplate`]s), hands them to [`MockSet::register`] together
//! with an interception backend, and queries the returned set by endpoint
//! name during assertions. No network stack is involved: backends are the
//! seam to whatever library intercepts HTTP traffic in the host test
//! suite, and the bundled in-memory backends make the contract executable
//! on its own.

pub mod config;
pub mod matching;
pub mod mocks;
pub mod types;

pub use config::error::ConfigError;
pub use matching::url::UrlPattern;
pub use mocks::backend::{DeferredBackend, EagerBackend, InterceptBackend};
pub use mocks::collection::{LookupError, MockSet, RegisterError};
pub use types::method::HttpMethod;
pub use types::spec::{Payload, ResponseSpec, TransportError};
pub use types::template::{EndpointTemplate, SpecError, SpecOverrides, TemplateRegistry};

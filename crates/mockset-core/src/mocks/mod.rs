//! Mock collection and interception backends.
//!
//! This module provides the pieces a test fixture wires together:
//! - [`MockSet`](collection::MockSet): ordered, name-indexed aggregate of registered specs
//! - [`InterceptBackend`](backend::InterceptBackend): the registration seam, with eager and
//!   deferred reference implementations

pub mod backend;
pub mod collection;

//! Core domain types for specs, templates, and registrations.

pub mod method;
pub mod registration;
pub mod spec;
pub mod template;

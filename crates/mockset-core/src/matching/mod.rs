//! Request matching utilities.

pub mod url;

pub use url::UrlPattern;

//! Endpoint template declarations loaded from config files.

pub mod error;
pub mod parser;

//! Utility functions for code generation, request inspection, and error mapping.
//!
//! - [`code_generator`] - Random short code generation and validation
//! - [`client_identity`] - Rate-limit key extraction from HTTP requests
//! - [`db_error`] - Opaque wrapping of database errors

pub mod client_identity;
pub mod code_generator;
pub mod db_error;

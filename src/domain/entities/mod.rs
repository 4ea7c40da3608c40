//! Core domain entities.
//!
//! - [`UrlRecord`] - A long URL and its (possibly not yet assigned) short code
//! - [`InsertOutcome`] - Tagged result of claiming a long URL

pub mod url_record;

pub use url_record::{InsertOutcome, UrlRecord};

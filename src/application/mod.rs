//! Application layer: use cases on top of the repository traits.
//!
//! - [`services::UrlService`] allocates, resolves and lists short codes
//! - [`maintenance`] runs the periodic orphan sweep and limiter pruning
//! - [`sleeper`] abstracts the retry backoff delay

pub mod maintenance;
pub mod services;
pub mod sleeper;

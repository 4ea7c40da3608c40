//! Domain layer containing business entities and logic.
//!
//! Independent of infrastructure. Repository traits here are implemented in
//! [`crate::infrastructure::persistence`].
//!
//! - [`entities`] - URL records and insert outcomes
//! - [`repositories`] - Store contract used by the services
//! - [`rate_limiter`] - Per-client fixed-window admission control

pub mod entities;
pub mod rate_limiter;
pub mod repositories;

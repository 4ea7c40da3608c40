//! REST API layer for HTTP request/response handling.
//!
//! Translates HTTP requests into [`crate::application::services::UrlService`]
//! calls and renders the results.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Admission control and request tracing
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

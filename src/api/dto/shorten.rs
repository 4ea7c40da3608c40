//! DTOs for the shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single URL.
///
/// Only the length is checked here. Scheme and host rules are enforced by
/// [`crate::application::services::url_service::validate_long_url`].
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    #[validate(length(min = 1, max = 2048, message = "long_url must be 1 to 2048 characters"))]
    pub long_url: String,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_url: String,
}

//! Handler for the URL listing endpoint.

use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::urls::{ListUrlsParams, ListUrlsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Store deadline for one listing request.
pub const LIST_DEADLINE: Duration = Duration::from_secs(5);

/// Lists shortened URLs, newest first.
///
/// # Endpoint
///
/// `GET /urls?page=1&limit=10`
///
/// Missing, non-numeric or non-positive parameters fall back to page 1 and
/// limit 10. A page past the end returns the last page.
///
/// # Response
///
/// ```json
/// {
///   "urls": [
///     {
///       "id": 1,
///       "long_url": "https://example.com/a",
///       "short_code": "K9x2LmQ4ab",
///       "short_url": "http://localhost:3000/K9x2LmQ4ab",
///       "click_count": 3,
///       "created_at": "2026-01-01T00:00:00Z",
///       "updated_at": "2026-01-02T08:30:00Z",
///       "last_accessed_at": null
///     }
///   ],
///   "total_count": 1,
///   "page": 1,
///   "limit": 10,
///   "total_pages": 1
/// }
/// ```
pub async fn list_urls_handler(
    State(state): State<AppState>,
    Query(params): Query<ListUrlsParams>,
) -> Result<Json<ListUrlsResponse>, AppError> {
    let page = state
        .url_service
        .list_urls(params.page, params.limit, LIST_DEADLINE)
        .await?;

    Ok(Json(ListUrlsResponse::from_page(page, &state.base_url)))
}

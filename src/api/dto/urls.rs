//! DTOs for the URL listing endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DisplayFromStr, serde_as};

use crate::application::services::UrlPage;

/// Query parameters for `GET /urls`.
///
/// Unparseable values are treated as absent, so `?page=abc` falls back to the
/// default page instead of failing the request.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListUrlsParams {
    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub page: Option<i64>,

    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UrlItem {
    pub id: i64,
    pub long_url: String,
    pub short_code: String,
    pub short_url: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ListUrlsResponse {
    pub urls: Vec<UrlItem>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl ListUrlsResponse {
    /// Renders a page, prefixing each code with `base_url`.
    ///
    /// Records without a code are skipped.
    pub fn from_page(page: UrlPage, base_url: &str) -> Self {
        let urls = page
            .records
            .into_iter()
            .filter_map(|r| {
                let short_code = r.short_code?;
                Some(UrlItem {
                    id: r.id,
                    short_url: format!("{base_url}{short_code}"),
                    long_url: r.long_url,
                    short_code,
                    click_count: r.click_count,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                    last_accessed_at: r.last_accessed_at,
                })
            })
            .collect();

        Self {
            urls,
            total_count: page.total_count,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
        }
    }
}

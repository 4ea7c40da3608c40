//! Short code allocation, resolution, and listing.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::application::sleeper::{Sleeper, TokioSleeper};
use crate::domain::entities::{InsertOutcome, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::metrics::{CODE_COLLISIONS, CODES_ALLOCATED, ORPHANS_SWEPT};
use crate::utils::code_generator::{MAX_CODE_LENGTH, generate_code, is_valid_code};

/// Default page number for listings.
pub const DEFAULT_PAGE: i64 = 1;
/// Default page size for listings.
pub const DEFAULT_LIMIT: i64 = 10;
/// Largest page size a listing returns.
pub const MAX_LIMIT: i64 = 1000;

/// Tuning knobs for code allocation.
#[derive(Debug, Clone, Copy)]
pub struct AllocatorSettings {
    /// Length of generated codes, 1 to 10.
    pub code_length: usize,
    /// Code draws before giving up on a collision streak.
    pub max_retries: u32,
    /// Fixed pause between code draws.
    pub backoff: Duration,
    /// How long a caller that lost the placeholder race waits for the
    /// winner's code.
    pub pending_wait: Duration,
    /// Pause between lookups while waiting for the winner.
    pub pending_poll: Duration,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self {
            code_length: MAX_CODE_LENGTH,
            max_retries: 5,
            backoff: Duration::from_millis(10),
            pending_wait: Duration::from_secs(2),
            pending_poll: Duration::from_millis(50),
        }
    }
}

impl AllocatorSettings {
    /// Lookups made by a caller that lost the placeholder race, at least 1.
    pub fn pending_lookups(&self) -> u32 {
        let poll = self.pending_poll.max(Duration::from_millis(1)).as_millis();
        let polls = self.pending_wait.as_millis().div_ceil(poll);
        u32::try_from(polls).unwrap_or(u32::MAX).saturating_add(1)
    }
}

/// One page of finalized records plus paging metadata.
#[derive(Debug, Clone)]
pub struct UrlPage {
    pub records: Vec<UrlRecord>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// Resolved paging parameters for a listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
    pub total_pages: i64,
}

impl PageWindow {
    /// Resolves requested paging against the number of records.
    ///
    /// - Missing or non-positive `page`/`limit` fall back to 1 and 10.
    /// - `limit` is capped at [`MAX_LIMIT`].
    /// - `total_pages` is `ceil(total_count / limit)`, at least 1.
    /// - A `page` past the last page is clamped to the last page.
    pub fn resolve(page: Option<i64>, limit: Option<i64>, total_count: i64) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);

        let total_pages = ((total_count.max(0) + limit - 1) / limit).max(1);
        let page = page.min(total_pages);

        Self {
            page,
            limit,
            offset: (page - 1) * limit,
            total_pages,
        }
    }
}

/// Allocates short codes for long URLs and resolves them back.
///
/// # Creation protocol
///
/// 1. Validate the long URL (no store access on failure).
/// 2. Return the existing code if the URL was already shortened.
/// 3. Claim the URL with a placeholder record. If another caller already
///    holds it, wait for that caller's code instead of failing.
/// 4. Draw random codes until one is free, pausing between attempts.
/// 5. Assign the code to the placeholder.
///
/// A placeholder whose code never gets assigned (retries exhausted or the
/// final write failed) stays behind as an orphan until the maintenance worker
/// removes it. The creation path has no cancellation point inside its retry
/// loops: once started it runs to completion or to its retry bound.
pub struct UrlService {
    repository: Arc<dyn UrlRepository>,
    sleeper: Arc<dyn Sleeper>,
    settings: AllocatorSettings,
}

impl UrlService {
    /// Creates a service that sleeps on the tokio timer between retries.
    pub fn new(repository: Arc<dyn UrlRepository>, settings: AllocatorSettings) -> Self {
        Self::with_sleeper(repository, Arc::new(TokioSleeper), settings)
    }

    /// Creates a service with a custom [`Sleeper`].
    pub fn with_sleeper(
        repository: Arc<dyn UrlRepository>,
        sleeper: Arc<dyn Sleeper>,
        settings: AllocatorSettings,
    ) -> Self {
        Self {
            repository,
            sleeper,
            settings,
        }
    }

    pub fn settings(&self) -> AllocatorSettings {
        self.settings
    }

    /// Returns the short code for `long_url`, allocating one if needed.
    ///
    /// Repeated calls with the same URL return the same code.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL is not an absolute http(s) URL
    /// - [`AppError::Unavailable`] if no free code was found within
    ///   `max_retries` draws, or the URL's existing record got no code within
    ///   `pending_wait`
    /// - [`AppError::Internal`] on store failures
    pub async fn create_short_url(&self, long_url: &str) -> Result<String, AppError> {
        validate_long_url(long_url)?;

        if let Some(code) = self.repository.find_code_by_long_url(long_url).await? {
            info!(long_url, code = %code, "Idempotency hit, returning existing code");
            return Ok(code);
        }

        let id = match self.repository.insert_placeholder(long_url).await? {
            InsertOutcome::Inserted(id) => id,
            InsertOutcome::AlreadyExists => {
                warn!(long_url, "Concurrent creation detected, waiting for the winner's code");
                return self.await_concurrent_code(long_url).await;
            }
        };
        debug!(id, long_url, "Inserted placeholder");

        let code = self.allocate_code(id).await?;

        self.repository.assign_code(id, &code).await?;
        metrics::counter!(CODES_ALLOCATED).increment(1);
        info!(id, long_url, code = %code, "Allocated short code");

        Ok(code)
    }

    /// Resolves `code` to its long URL and records the access.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record holds the code.
    /// Returns [`AppError::Internal`] on store failures.
    pub async fn get_long_url(&self, code: &str) -> Result<String, AppError> {
        if !is_valid_code(code) {
            return Err(not_found(code));
        }

        self.repository
            .resolve_and_track(code)
            .await?
            .ok_or_else(|| not_found(code))
    }

    /// Looks up a record by code without counting an access.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record holds the code.
    pub async fn get_record(&self, code: &str) -> Result<UrlRecord, AppError> {
        if !is_valid_code(code) {
            return Err(not_found(code));
        }

        self.repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| not_found(code))
    }

    /// Lists finalized records, newest first.
    ///
    /// See [`PageWindow::resolve`] for defaults and clamping. The store calls
    /// are abandoned once `deadline` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] on deadline expiry.
    /// Returns [`AppError::Internal`] on store failures.
    pub async fn list_urls(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
        deadline: Duration,
    ) -> Result<UrlPage, AppError> {
        with_deadline(deadline, "list_urls", async {
            let total_count = self.repository.count().await?;
            let window = PageWindow::resolve(page, limit, total_count);
            let records = self.repository.list(window.limit, window.offset).await?;

            Ok::<_, AppError>(UrlPage {
                records,
                total_count,
                page: window.page,
                limit: window.limit,
                total_pages: window.total_pages,
            })
        })
        .await
    }

    /// Checks that the store answers within `deadline`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] on deadline expiry, or the store's
    /// error if the ping fails.
    pub async fn health_check(&self, deadline: Duration) -> Result<(), AppError> {
        with_deadline(deadline, "health_check", self.repository.ping()).await
    }

    /// Deletes placeholders older than `grace` that never received a code.
    ///
    /// The grace period keeps in-flight creations from losing their
    /// placeholder. Returns the number of deleted records.
    pub async fn sweep_orphans(&self, grace: Duration) -> Result<u64, AppError> {
        let grace = chrono::Duration::from_std(grace).unwrap_or(chrono::Duration::MAX);
        let cutoff = Utc::now()
            .checked_sub_signed(grace)
            .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);

        let deleted = self.repository.delete_orphans(cutoff).await?;
        if deleted > 0 {
            metrics::counter!(ORPHANS_SWEPT).increment(deleted);
            info!(deleted, %cutoff, "Swept orphan records");
        }

        Ok(deleted)
    }

    /// Counts placeholders that never received a code.
    pub async fn count_orphans(&self) -> Result<i64, AppError> {
        self.repository.count_orphans().await
    }

    /// Draws random codes until the store reports one as free.
    async fn allocate_code(&self, id: i64) -> Result<String, AppError> {
        let max_retries = self.settings.max_retries.max(1);

        for attempt in 1..=max_retries {
            let candidate = generate_code(self.settings.code_length).map_err(|e| {
                error!(id, error = %e, "Random source failed");
                AppError::internal("Code generation failed", json!({}))
            })?;

            if !self.repository.code_exists(&candidate).await? {
                debug!(id, code = %candidate, attempt, "Found unique code");
                return Ok(candidate);
            }

            metrics::counter!(CODE_COLLISIONS).increment(1);
            warn!(id, code = %candidate, attempt, max_retries, "Short code collision");

            if attempt < max_retries {
                self.sleeper.sleep(self.settings.backoff).await;
            }
        }

        error!(id, max_retries, "No unique short code found, placeholder left unassigned");
        Err(AppError::unavailable(
            "Short code generation failed. Try again later.",
            json!({ "attempts": max_retries }),
        ))
    }

    /// Polls for the code assigned by a concurrent creator of `long_url`.
    ///
    /// Gives up after [`AllocatorSettings::pending_wait`]. The record may
    /// also be an orphan left by a creator that failed; it blocks the URL
    /// until a sweep removes it.
    async fn await_concurrent_code(&self, long_url: &str) -> Result<String, AppError> {
        let lookups = self.settings.pending_lookups();

        for attempt in 1..=lookups {
            if let Some(code) = self.repository.find_code_by_long_url(long_url).await? {
                info!(long_url, code = %code, attempt, "Returning code assigned by concurrent creator");
                return Ok(code);
            }

            if attempt < lookups {
                self.sleeper.sleep(self.settings.pending_poll).await;
            }
        }

        warn!(
            long_url,
            waited_ms = self.settings.pending_wait.as_millis() as u64,
            "No code assigned to the existing record"
        );
        Err(AppError::unavailable(
            "Short URL is not available yet for this address. Try again later.",
            json!({}),
        ))
    }
}

/// Checks that `long_url` is an absolute http(s) URL with a host.
///
/// # Errors
///
/// Returns [`AppError::Validation`] otherwise.
pub fn validate_long_url(long_url: &str) -> Result<(), AppError> {
    let invalid = |reason: &str| {
        AppError::bad_request("invalid URL format", json!({ "reason": reason }))
    };

    if long_url.trim() != long_url {
        return Err(invalid("surrounding whitespace"));
    }

    let parsed = url::Url::parse(long_url).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }

    Ok(())
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short code not found", json!({ "code": code }))
}

async fn with_deadline<T>(
    deadline: Duration,
    operation: &'static str,
    fut: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    tokio::time::timeout(deadline, fut).await.map_err(|_| {
        warn!(operation, timeout_ms = deadline.as_millis() as u64, "Store call timed out");
        AppError::unavailable(
            "Store did not respond in time",
            json!({ "operation": operation }),
        )
    })?
}

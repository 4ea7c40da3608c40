//! Repository trait for URL record storage.

use crate::domain::entities::{InsertOutcome, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage primitives the allocator composes.
///
/// Every method must be a single atomic operation against the backing store.
/// The allocator never wraps several calls in a transaction, so correctness
/// under concurrency depends on each primitive being indivisible.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Inserts a record for `long_url` with no short code.
    ///
    /// Returns [`InsertOutcome::AlreadyExists`] instead of an error when a
    /// record for the same long URL is already present.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert_placeholder(&self, long_url: &str) -> Result<InsertOutcome, AppError>;

    /// Returns the short code of the record for `long_url`, if it has one.
    ///
    /// Placeholders without a code yield `Ok(None)`.
    async fn find_code_by_long_url(&self, long_url: &str) -> Result<Option<String>, AppError>;

    /// Returns true if any record already holds `code`.
    async fn code_exists(&self, code: &str) -> Result<bool, AppError>;

    /// Sets the short code of placeholder `id` and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the record is gone, already has a
    /// code, or the database rejects the write.
    async fn assign_code(&self, id: i64, code: &str) -> Result<(), AppError>;

    /// Increments the click count of the record holding `code`, stamps
    /// `last_accessed_at`/`updated_at`, and returns its long URL.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(long_url))` if found
    /// - `Ok(None)` if no record holds the code
    async fn resolve_and_track(&self, code: &str) -> Result<Option<String>, AppError>;

    /// Looks up a finalized record by code without tracking a click.
    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Lists finalized records, newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UrlRecord>, AppError>;

    /// Counts finalized records.
    async fn count(&self) -> Result<i64, AppError>;

    /// Counts placeholders that never received a code.
    async fn count_orphans(&self) -> Result<i64, AppError>;

    /// Deletes placeholders created before `older_than`.
    ///
    /// Returns the number of deleted records.
    async fn delete_orphans(&self, older_than: DateTime<Utc>) -> Result<u64, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}

//! In-process implementation of the URL repository.
//!
//! Used by tests and by local runs that do not need durability. All state sits
//! behind one mutex, which makes every primitive atomic in the same way a
//! single SQL statement is.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use crate::domain::entities::{InsertOutcome, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    records: BTreeMap<i64, UrlRecord>,
    by_long_url: HashMap<String, i64>,
    by_code: HashMap<String, i64>,
}

/// Mutex-guarded map of URL records with the same uniqueness rules as the
/// PostgreSQL schema (unique long URL, unique assigned code).
#[derive(Debug, Default)]
pub struct InMemoryUrlRepository {
    inner: Mutex<Inner>,
}

impl InMemoryUrlRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every stored record, placeholders included.
    pub fn snapshot(&self) -> Vec<UrlRecord> {
        self.lock().records.values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn insert_placeholder(&self, long_url: &str) -> Result<InsertOutcome, AppError> {
        let mut inner = self.lock();

        if inner.by_long_url.contains_key(long_url) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .records
            .insert(id, UrlRecord::placeholder(id, long_url.to_string(), Utc::now()));
        inner.by_long_url.insert(long_url.to_string(), id);

        Ok(InsertOutcome::Inserted(id))
    }

    async fn find_code_by_long_url(&self, long_url: &str) -> Result<Option<String>, AppError> {
        let inner = self.lock();

        Ok(inner
            .by_long_url
            .get(long_url)
            .and_then(|id| inner.records.get(id))
            .and_then(|record| record.short_code.clone()))
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.lock().by_code.contains_key(code))
    }

    async fn assign_code(&self, id: i64, code: &str) -> Result<(), AppError> {
        let mut inner = self.lock();

        if inner.by_code.contains_key(code) {
            tracing::warn!(id, code, "Short code was taken between check and assignment");
            return Err(AppError::internal("Database error", json!({})));
        }

        let Some(record) = inner.records.get_mut(&id).filter(|r| !r.is_finalized()) else {
            tracing::error!(id, code, "Placeholder missing or already finalized");
            return Err(AppError::internal("Database error", json!({})));
        };

        record.short_code = Some(code.to_string());
        record.updated_at = Utc::now();
        inner.by_code.insert(code.to_string(), id);

        Ok(())
    }

    async fn resolve_and_track(&self, code: &str) -> Result<Option<String>, AppError> {
        let mut inner = self.lock();

        let Some(id) = inner.by_code.get(code).copied() else {
            return Ok(None);
        };

        Ok(inner.records.get_mut(&id).map(|record| {
            let now = Utc::now();
            record.click_count += 1;
            record.last_accessed_at = Some(now);
            record.updated_at = now;
            record.long_url.clone()
        }))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        let inner = self.lock();

        Ok(inner
            .by_code
            .get(code)
            .and_then(|id| inner.records.get(id))
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UrlRecord>, AppError> {
        let inner = self.lock();

        let mut records: Vec<UrlRecord> = inner
            .records
            .values()
            .filter(|r| r.is_finalized())
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(records
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.lock().by_code.len() as i64)
    }

    async fn count_orphans(&self) -> Result<i64, AppError> {
        let inner = self.lock();
        Ok((inner.records.len() - inner.by_code.len()) as i64)
    }

    async fn delete_orphans(&self, older_than: DateTime<Utc>) -> Result<u64, AppError> {
        let mut inner = self.lock();

        let orphans: Vec<(i64, String)> = inner
            .records
            .values()
            .filter(|r| r.is_orphan_before(older_than))
            .map(|r| (r.id, r.long_url.clone()))
            .collect();

        for (id, long_url) in &orphans {
            inner.records.remove(id);
            inner.by_long_url.remove(long_url);
        }

        Ok(orphans.len() as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

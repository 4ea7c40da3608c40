//! URL record entity: one long URL and the short code allocated for it.

use chrono::{DateTime, Utc};

/// A stored URL mapping with click-tracking metadata.
///
/// `short_code` is `None` while the record is a placeholder (inserted but not
/// yet finalized). It is set exactly once and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UrlRecord {
    pub id: i64,
    pub long_url: String,
    pub short_code: Option<String>,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl UrlRecord {
    /// Creates a freshly inserted placeholder record.
    pub fn placeholder(id: i64, long_url: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            long_url,
            short_code: None,
            click_count: 0,
            created_at: now,
            updated_at: now,
            last_accessed_at: None,
        }
    }

    /// Returns true once a short code has been assigned.
    pub fn is_finalized(&self) -> bool {
        self.short_code.is_some()
    }

    /// Returns true if the record never got a code and is older than `cutoff`.
    pub fn is_orphan_before(&self, cutoff: DateTime<Utc>) -> bool {
        !self.is_finalized() && self.created_at < cutoff
    }
}

/// Result of claiming a long URL with a placeholder record.
///
/// The long-URL uniqueness constraint is the serialization point between
/// concurrent creators: exactly one of them sees `Inserted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new placeholder was written with this id.
    Inserted(i64),
    /// Another record already holds this long URL.
    AlreadyExists,
}

//! Conversion of database errors into opaque application errors.

use std::fmt::Display;

use serde_json::json;

use crate::error::AppError;

/// Builds a mapper that logs a store failure with its operation context and
/// returns an opaque [`AppError::Internal`].
///
/// The original error text is only logged, never returned to callers.
///
/// # Example
///
/// ```rust,ignore
/// sqlx::query("...")
///     .execute(pool)
///     .await
///     .map_err(store_error("assign_code", id))?;
/// ```
pub fn store_error<K: Display>(
    operation: &'static str,
    key: K,
) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!(operation, key = %key, error = %e, "Store operation failed");
        AppError::internal("Database error", json!({}))
    }
}

/// Returns true if `e` is a unique violation on the given constraint.
pub fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
}

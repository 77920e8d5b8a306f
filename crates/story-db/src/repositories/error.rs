//! Error handling utilities for repositories

use sqlx::Error as SqlxError;
use story_core::error::{DomainError, EngagementKind};
use story_core::value_objects::{ActorId, ItemId};

/// SQLSTATE codes that mean "try the whole transaction again"
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    if is_transient(&e) {
        DomainError::TransientStore(e.to_string())
    } else {
        DomainError::DatabaseError(e.to_string())
    }
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

/// Timeouts, dropped connections, and aborted transactions
fn is_transient(e: &SqlxError) -> bool {
    match e {
        SqlxError::PoolTimedOut
        | SqlxError::PoolClosed
        | SqlxError::Io(_)
        | SqlxError::WorkerCrashed => true,
        SqlxError::Database(db) => matches!(
            db.code().as_deref(),
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
        ),
        _ => false,
    }
}

/// Create an "item not found" error
pub fn item_not_found(id: ItemId) -> DomainError {
    DomainError::ItemNotFound(id)
}

/// Lost insert race on a per-(actor, item) row
pub fn engagement_conflict(actor_id: ActorId, item_id: ItemId, kind: EngagementKind) -> DomainError {
    DomainError::EngagementConflict {
        actor_id,
        item_id,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_transient() {
        let err = map_db_error(SqlxError::PoolTimedOut);
        assert!(err.is_retryable());
        assert_eq!(err.code(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn test_row_not_found_is_not_transient() {
        let err = map_db_error(SqlxError::RowNotFound);
        assert!(!err.is_retryable());
        assert_eq!(err.code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_non_database_error_skips_unique_branch() {
        let err = map_unique_violation(SqlxError::PoolClosed, || {
            engagement_conflict(ActorId::new(1), ItemId::new(1), EngagementKind::Bookmark)
        });
        assert!(!err.is_conflict());
        assert!(err.is_retryable());
    }
}

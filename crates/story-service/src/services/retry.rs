//! Recovery from lost insert races

use std::future::Future;

use story_core::traits::RepoResult;
use tracing::warn;

/// How many times an operation is re-run after losing an insert race
pub const MAX_CONFLICT_RETRIES: u32 = 3;

/// Run `op`, re-running it from scratch whenever it reports
/// `EngagementConflict`. Each re-run rereads the committed row, so the
/// operation branches on the state the winning request left behind.
pub(crate) async fn with_conflict_retry<T, F, Fut>(mut op: F) -> RepoResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RepoResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(err) if err.is_conflict() && attempt < MAX_CONFLICT_RETRIES => {
                attempt += 1;
                warn!(attempt, error = %err, "Lost engagement insert race, re-running");
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use story_core::{ActorId, DomainError, EngagementKind, ItemId};

    fn conflict() -> DomainError {
        DomainError::EngagementConflict {
            actor_id: ActorId::new(1),
            item_id: ItemId::new(1),
            kind: EngagementKind::Bookmark,
        }
    }

    #[tokio::test]
    async fn test_recovers_after_conflict() {
        let calls = AtomicU32::new(0);
        let result = with_conflict_retry(|| async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(conflict())
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: RepoResult<()> = with_conflict_retry(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(conflict())
        })
        .await;

        assert!(result.unwrap_err().is_conflict());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_CONFLICT_RETRIES + 1);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: RepoResult<()> = with_conflict_retry(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::TransientStore("connection reset".into()))
        })
        .await;

        assert!(result.unwrap_err().is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

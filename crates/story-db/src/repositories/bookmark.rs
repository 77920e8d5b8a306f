//! PostgreSQL implementation of BookmarkRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use story_core::entities::{Bookmark, BookmarkOutcome};
use story_core::error::EngagementKind;
use story_core::traits::{BookmarkRepository, RepoResult};
use story_core::value_objects::{ActorId, ItemId};

use crate::models::{BookmarkModel, BookmarkStatusModel};

use super::error::{engagement_conflict, item_not_found, map_db_error, map_unique_violation};
use super::tx::{bump_counter, lock_published_item, CounterColumn};

/// PostgreSQL implementation of BookmarkRepository
#[derive(Clone)]
pub struct PgBookmarkRepository {
    pool: PgPool,
}

impl PgBookmarkRepository {
    /// Create a new PgBookmarkRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookmarkRepository for PgBookmarkRepository {
    #[instrument(skip(self))]
    async fn status(&self, actor_id: ActorId, item_id: ItemId) -> RepoResult<BookmarkOutcome> {
        let result = sqlx::query_as::<_, BookmarkStatusModel>(
            r#"
            SELECT
                EXISTS (
                    SELECT 1 FROM bookmarks b WHERE b.actor_id = $1 AND b.item_id = i.id
                ) AS is_bookmarked,
                i.save_count
            FROM items i
            WHERE i.id = $2 AND i.status = 'published'
            "#,
        )
        .bind(actor_id.into_inner())
        .bind(item_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| item_not_found(item_id))?;

        Ok(BookmarkOutcome {
            is_bookmarked: result.is_bookmarked,
            save_count: result.save_count,
        })
    }

    #[instrument(skip(self))]
    async fn toggle(&self, actor_id: ActorId, item_id: ItemId) -> RepoResult<BookmarkOutcome> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        lock_published_item(&mut tx, item_id).await?;

        let exists = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT 1 FROM bookmarks WHERE actor_id = $1 AND item_id = $2 FOR UPDATE
            "#,
        )
        .bind(actor_id.into_inner())
        .bind(item_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .is_some();

        let delta = if exists {
            sqlx::query(
                r#"
                DELETE FROM bookmarks WHERE actor_id = $1 AND item_id = $2
                "#,
            )
            .bind(actor_id.into_inner())
            .bind(item_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
            -1
        } else {
            sqlx::query(
                r#"
                INSERT INTO bookmarks (actor_id, item_id) VALUES ($1, $2)
                "#,
            )
            .bind(actor_id.into_inner())
            .bind(item_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                map_unique_violation(e, || {
                    engagement_conflict(actor_id, item_id, EngagementKind::Bookmark)
                })
            })?;
            1
        };

        let save_count = bump_counter(&mut tx, item_id, CounterColumn::Save, delta).await?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(BookmarkOutcome {
            is_bookmarked: !exists,
            save_count,
        })
    }

    #[instrument(skip(self))]
    async fn find_by_actor(
        &self,
        actor_id: ActorId,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Bookmark>> {
        let limit = limit.clamp(1, 100);

        let results = sqlx::query_as::<_, BookmarkModel>(
            r#"
            SELECT b.actor_id, b.item_id, b.created_at
            FROM bookmarks b
            JOIN items i ON i.id = b.item_id
            WHERE b.actor_id = $1 AND i.status = 'published'
            ORDER BY b.created_at DESC, b.item_id DESC
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(actor_id.into_inner())
        .bind(offset.max(0))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Bookmark::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_by_actor(&self, actor_id: ActorId) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM bookmarks b
            JOIN items i ON i.id = b.item_id
            WHERE b.actor_id = $1 AND i.status = 'published'
            "#,
        )
        .bind(actor_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgBookmarkRepository>();
    }
}

//! PostgreSQL implementation of CommentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use story_core::entities::{Comment, CommentOutcome, NewComment};
use story_core::error::DomainError;
use story_core::traits::{CommentRepository, RepoResult};

use crate::models::CommentModel;

use super::error::map_db_error;
use super::tx::{bump_counter, lock_published_item, CounterColumn};

/// PostgreSQL implementation of CommentRepository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Create a new PgCommentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[instrument(skip(self, comment), fields(item_id = %comment.item_id, actor_id = %comment.actor_id))]
    async fn create(&self, comment: &NewComment) -> RepoResult<CommentOutcome> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let owner_id = lock_published_item(&mut tx, comment.item_id).await?;

        // A reply must stay on the same item as its parent
        if let Some(parent_id) = comment.parent_id {
            let parent_ok = sqlx::query_scalar::<_, bool>(
                r#"
                SELECT EXISTS (SELECT 1 FROM comments WHERE id = $1 AND item_id = $2)
                "#,
            )
            .bind(parent_id.into_inner())
            .bind(comment.item_id.into_inner())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;

            if !parent_ok {
                return Err(DomainError::CommentNotFound(parent_id));
            }
        }

        let model = sqlx::query_as::<_, CommentModel>(
            r#"
            INSERT INTO comments (item_id, actor_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, item_id, actor_id, parent_id, content, created_at
            "#,
        )
        .bind(comment.item_id.into_inner())
        .bind(comment.actor_id.into_inner())
        .bind(comment.parent_id.map(|id| id.into_inner()))
        .bind(&comment.content)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let comment_count =
            bump_counter(&mut tx, comment.item_id, CounterColumn::Comment, 1).await?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(CommentOutcome {
            comment: Comment::from(model),
            comment_count,
            owner_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgCommentRepository>();
    }
}

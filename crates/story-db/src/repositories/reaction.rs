//! PostgreSQL implementation of ReactionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use story_core::entities::{
    Reaction, ReactionAction, ReactionOutcome, ReactionRequest, ReactionType,
};
use story_core::error::EngagementKind;
use story_core::traits::{ReactionRepository, RepoResult};
use story_core::value_objects::{ActorId, ItemId};

use crate::mappers::ReactionInsert;
use crate::models::ReactionModel;

use super::error::{engagement_conflict, map_db_error, map_unique_violation};
use super::tx::{bump_counter, lock_published_item, read_counter, CounterColumn};

/// PostgreSQL implementation of ReactionRepository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    /// Create a new PgReactionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self))]
    async fn find(&self, actor_id: ActorId, item_id: ItemId) -> RepoResult<Option<Reaction>> {
        let result = sqlx::query_as::<_, ReactionModel>(
            r#"
            SELECT actor_id, item_id, reaction_type, message, created_at, updated_at
            FROM reactions
            WHERE actor_id = $1 AND item_id = $2
            "#,
        )
        .bind(actor_id.into_inner())
        .bind(item_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Reaction::try_from).transpose()
    }

    #[instrument(skip(self, request), fields(actor_id = %request.actor_id, item_id = %request.item_id))]
    async fn toggle(&self, request: &ReactionRequest) -> RepoResult<ReactionOutcome> {
        let row = ReactionInsert::new(request);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let owner_id = lock_published_item(&mut tx, request.item_id).await?;

        let existing = sqlx::query_scalar::<_, String>(
            r#"
            SELECT reaction_type
            FROM reactions
            WHERE actor_id = $1 AND item_id = $2
            FOR UPDATE
            "#,
        )
        .bind(row.actor_id)
        .bind(row.item_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .map(|s| s.parse::<ReactionType>())
        .transpose()?;

        let action = ReactionAction::resolve(existing, request.reaction_type);
        debug!(?existing, %action, "Resolved reaction transition");

        match action {
            ReactionAction::Added => {
                sqlx::query(
                    r#"
                    INSERT INTO reactions (actor_id, item_id, reaction_type, message)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(row.actor_id)
                .bind(row.item_id)
                .bind(row.reaction_type)
                .bind(row.message)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    map_unique_violation(e, || {
                        engagement_conflict(
                            request.actor_id,
                            request.item_id,
                            EngagementKind::Reaction,
                        )
                    })
                })?;
            }
            ReactionAction::Removed => {
                sqlx::query(
                    r#"
                    DELETE FROM reactions WHERE actor_id = $1 AND item_id = $2
                    "#,
                )
                .bind(row.actor_id)
                .bind(row.item_id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
            }
            ReactionAction::Changed => {
                sqlx::query(
                    r#"
                    UPDATE reactions
                    SET reaction_type = $3, message = $4, updated_at = NOW()
                    WHERE actor_id = $1 AND item_id = $2
                    "#,
                )
                .bind(row.actor_id)
                .bind(row.item_id)
                .bind(row.reaction_type)
                .bind(row.message)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
            }
        }

        let support_count = match action.support_delta() {
            0 => read_counter(&mut tx, request.item_id, CounterColumn::Support).await?,
            delta => {
                bump_counter(&mut tx, request.item_id, CounterColumn::Support, delta).await?
            }
        };

        tx.commit().await.map_err(map_db_error)?;

        Ok(ReactionOutcome {
            action,
            support_count,
            actor_reaction: action.actor_reaction(request.reaction_type),
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
        assert_send_sync::<PgReactionRepository>();
    }
}

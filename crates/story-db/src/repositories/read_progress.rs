//! PostgreSQL implementation of ReadProgressRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use story_core::entities::{ReadOutcome, ReadProgress, ReadSample, ReadSignal};
use story_core::error::EngagementKind;
use story_core::traits::{ReadProgressRepository, RepoResult};
use story_core::value_objects::{ActorId, ItemId};

use crate::mappers::ReadProgressWrite;
use crate::models::{ReadCountersModel, ReadProgressModel};

use super::error::{engagement_conflict, item_not_found, map_db_error, map_unique_violation};
use super::tx::lock_published_item;

const PROGRESS_COLUMNS: &str = "actor_id, item_id, scroll_depth, time_spent_seconds, completed, \
                                read_count, first_read_at, last_read_at";

/// PostgreSQL implementation of ReadProgressRepository
#[derive(Clone)]
pub struct PgReadProgressRepository {
    pool: PgPool,
}

impl PgReadProgressRepository {
    /// Create a new PgReadProgressRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Views only: no progress row, no reader accounting
    async fn record_anonymous(&self, item_id: ItemId) -> RepoResult<ReadOutcome> {
        let counters = sqlx::query_as::<_, ReadCountersModel>(
            r#"
            UPDATE items
            SET view_count = view_count + 1
            WHERE id = $1 AND status = 'published'
            RETURNING view_count, unique_readers, reread_count, completion_rate
            "#,
        )
        .bind(item_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| item_not_found(item_id))?;

        Ok(outcome(counters, None, false))
    }

    async fn record_authenticated(
        &self,
        actor_id: ActorId,
        item_id: ItemId,
        sample: ReadSample,
        now: DateTime<Utc>,
    ) -> RepoResult<ReadOutcome> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        lock_published_item(&mut tx, item_id).await?;

        let existing = select_progress(&mut tx, actor_id, item_id, true).await?;
        let is_new_reader = existing.is_none();

        let progress = match existing {
            Some(mut progress) => {
                progress.absorb(sample, now);
                update_progress(&mut tx, &ReadProgressWrite::new(&progress)).await?;
                progress
            }
            None => {
                let progress = ReadProgress::first(actor_id, item_id, sample, now);
                insert_progress(&mut tx, &ReadProgressWrite::new(&progress))
                    .await
                    .map_err(|e| {
                        map_unique_violation(e, || {
                            engagement_conflict(actor_id, item_id, EngagementKind::ReadProgress)
                        })
                    })?;
                progress
            }
        };

        // completion_rate is re-derived from the rows, including the one just written
        let counters = sqlx::query_as::<_, ReadCountersModel>(
            r#"
            UPDATE items
            SET view_count = view_count + 1,
                unique_readers = unique_readers + $2,
                reread_count = reread_count + $3,
                completion_rate = LEAST(GREATEST(COALESCE(
                    (SELECT AVG(scroll_depth) FROM read_progress WHERE item_id = $1), 0), 0), 1)
            WHERE id = $1
            RETURNING view_count, unique_readers, reread_count, completion_rate
            "#,
        )
        .bind(item_id.into_inner())
        .bind(i64::from(is_new_reader))
        .bind(i64::from(!is_new_reader))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(outcome(counters, Some(progress), is_new_reader))
    }
}

fn outcome(
    counters: ReadCountersModel,
    progress: Option<ReadProgress>,
    is_new_reader: bool,
) -> ReadOutcome {
    ReadOutcome {
        view_count: counters.view_count,
        unique_readers: counters.unique_readers,
        reread_count: counters.reread_count,
        completion_rate: counters.completion_rate,
        progress,
        is_new_reader,
    }
}

async fn select_progress(
    conn: &mut PgConnection,
    actor_id: ActorId,
    item_id: ItemId,
    for_update: bool,
) -> RepoResult<Option<ReadProgress>> {
    let sql = format!(
        "SELECT {PROGRESS_COLUMNS} FROM read_progress WHERE actor_id = $1 AND item_id = $2{}",
        if for_update { " FOR UPDATE" } else { "" }
    );

    let result = sqlx::query_as::<_, ReadProgressModel>(&sql)
        .bind(actor_id.into_inner())
        .bind(item_id.into_inner())
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)?;

    Ok(result.map(ReadProgress::from))
}

async fn insert_progress(
    conn: &mut PgConnection,
    row: &ReadProgressWrite,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO read_progress
            (actor_id, item_id, scroll_depth, time_spent_seconds, completed,
             read_count, first_read_at, last_read_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(row.actor_id)
    .bind(row.item_id)
    .bind(row.scroll_depth)
    .bind(row.time_spent_seconds)
    .bind(row.completed)
    .bind(row.read_count)
    .bind(row.first_read_at)
    .bind(row.last_read_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn update_progress(conn: &mut PgConnection, row: &ReadProgressWrite) -> RepoResult<()> {
    sqlx::query(
        r#"
        UPDATE read_progress
        SET scroll_depth = $3,
            time_spent_seconds = $4,
            completed = $5,
            read_count = $6,
            last_read_at = $7
        WHERE actor_id = $1 AND item_id = $2
        "#,
    )
    .bind(row.actor_id)
    .bind(row.item_id)
    .bind(row.scroll_depth)
    .bind(row.time_spent_seconds)
    .bind(row.completed)
    .bind(row.read_count)
    .bind(row.last_read_at)
    .execute(&mut *conn)
    .await
    .map_err(map_db_error)?;

    Ok(())
}

#[async_trait]
impl ReadProgressRepository for PgReadProgressRepository {
    #[instrument(skip(self))]
    async fn find(&self, actor_id: ActorId, item_id: ItemId) -> RepoResult<Option<ReadProgress>> {
        let mut conn = self.pool.acquire().await.map_err(map_db_error)?;
        select_progress(&mut conn, actor_id, item_id, false).await
    }

    #[instrument(skip(self, now), fields(item_id = %signal.item_id()))]
    async fn record(&self, signal: &ReadSignal, now: DateTime<Utc>) -> RepoResult<ReadOutcome> {
        match *signal {
            ReadSignal::AnonymousView { item_id } => self.record_anonymous(item_id).await,
            ReadSignal::AuthenticatedRead {
                actor_id,
                item_id,
                sample,
            } => {
                self.record_authenticated(actor_id, item_id, sample, now)
                    .await
            }
        }
    }
}

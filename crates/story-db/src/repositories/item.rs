//! PostgreSQL implementation of ItemRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use story_core::entities::{Category, EngagementCounters, Item, ReconcileReport};
use story_core::ranking::{ItemFilter, ItemOrder};
use story_core::traits::{ItemRepository, RepoResult, MAX_BATCH_SIZE};
use story_core::value_objects::ItemId;

use crate::models::{CountersModel, ItemModel};

use super::error::{item_not_found, map_db_error};

const ITEM_COLUMNS: &str = "id, owner_id, category, status, published_at, view_count, save_count, \
                            support_count, comment_count, unique_readers, reread_count, \
                            completion_rate, rank_score, last_ranked_at";

/// `$1` category (nullable), `$2` exclude private, `$3` private categories
const FEED_FILTER: &str = "status = 'published' \
                           AND ($1::TEXT IS NULL OR category = $1) \
                           AND NOT ($2 AND category = ANY($3))";

/// PostgreSQL implementation of ItemRepository
#[derive(Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    /// Create a new PgItemRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// ORDER BY matching `ItemOrder::compare`
fn order_clause(order: ItemOrder) -> &'static str {
    match order {
        ItemOrder::RankScore => "rank_score DESC, published_at DESC NULLS LAST, id DESC",
        ItemOrder::Latest => "published_at DESC NULLS LAST, id DESC",
        ItemOrder::Trending => "support_count DESC, published_at DESC NULLS LAST, id DESC",
        ItemOrder::MostViewed => "view_count DESC, published_at DESC NULLS LAST, id DESC",
    }
}

fn private_categories() -> Vec<String> {
    Category::ALL
        .into_iter()
        .filter(|c| c.is_privacy_sensitive())
        .map(|c| c.as_str().to_string())
        .collect()
}

fn into_items(models: Vec<ItemModel>) -> RepoResult<Vec<Item>> {
    models.into_iter().map(Item::try_from).collect()
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1");

        let result = sqlx::query_as::<_, ItemModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Item::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_published(&self, filter: ItemFilter) -> RepoResult<Vec<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE {FEED_FILTER}");

        let results = sqlx::query_as::<_, ItemModel>(&sql)
            .bind(filter.category.map(Category::as_str))
            .bind(filter.exclude_private)
            .bind(private_categories())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        into_items(results)
    }

    #[instrument(skip(self))]
    async fn page_published(
        &self,
        filter: ItemFilter,
        order: ItemOrder,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Item>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE {FEED_FILTER} ORDER BY {} OFFSET $4 LIMIT $5",
            order_clause(order)
        );

        let results = sqlx::query_as::<_, ItemModel>(&sql)
            .bind(filter.category.map(Category::as_str))
            .bind(filter.exclude_private)
            .bind(private_categories())
            .bind(offset.max(0))
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        into_items(results)
    }

    #[instrument(skip(self))]
    async fn count_published(&self, filter: ItemFilter) -> RepoResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM items WHERE {FEED_FILTER}");

        sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.category.map(Category::as_str))
            .bind(filter.exclude_private)
            .bind(private_categories())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn published_batch(&self, after: Option<ItemId>, limit: i64) -> RepoResult<Vec<Item>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE status = 'published' AND ($1::BIGINT IS NULL OR id > $1) \
             ORDER BY id LIMIT $2"
        );

        let results = sqlx::query_as::<_, ItemModel>(&sql)
            .bind(after.map(ItemId::into_inner))
            .bind(limit.clamp(1, i64::from(MAX_BATCH_SIZE)))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        into_items(results)
    }

    #[instrument(skip(self))]
    async fn unranked_published(&self, filter: ItemFilter, limit: i64) -> RepoResult<Vec<Item>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE {FEED_FILTER} AND last_ranked_at IS NULL \
             ORDER BY id LIMIT $4"
        );

        let results = sqlx::query_as::<_, ItemModel>(&sql)
            .bind(filter.category.map(Category::as_str))
            .bind(filter.exclude_private)
            .bind(private_categories())
            .bind(limit.clamp(1, i64::from(MAX_BATCH_SIZE)))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        into_items(results)
    }

    #[instrument(skip(self))]
    async fn update_rank_score(
        &self,
        id: ItemId,
        score: f64,
        ranked_at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET rank_score = $2, last_ranked_at = $3
            WHERE id = $1 AND status = 'published'
            "#,
        )
        .bind(id.into_inner())
        .bind(score)
        .bind(ranked_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn item_ids_after(&self, after: Option<ItemId>, limit: i64) -> RepoResult<Vec<ItemId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM items
            WHERE $1::BIGINT IS NULL OR id > $1
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(after.map(ItemId::into_inner))
        .bind(limit.clamp(1, i64::from(MAX_BATCH_SIZE)))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(ItemId::new).collect())
    }

    #[instrument(skip(self))]
    async fn reconcile_counters(&self, id: ItemId) -> RepoResult<ReconcileReport> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let before = sqlx::query_as::<_, CountersModel>(
            r#"
            SELECT view_count, save_count, support_count, comment_count,
                   unique_readers, reread_count, completion_rate
            FROM items
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| item_not_found(id))?;

        let after = sqlx::query_as::<_, CountersModel>(
            r#"
            UPDATE items SET
                support_count = (SELECT COUNT(*) FROM reactions WHERE item_id = $1),
                save_count = (SELECT COUNT(*) FROM bookmarks WHERE item_id = $1),
                comment_count = (SELECT COUNT(*) FROM comments WHERE item_id = $1),
                unique_readers = (SELECT COUNT(*) FROM read_progress WHERE item_id = $1),
                reread_count = (
                    SELECT COALESCE(SUM(read_count - 1), 0)::BIGINT
                    FROM read_progress WHERE item_id = $1
                ),
                completion_rate = LEAST(GREATEST(COALESCE(
                    (SELECT AVG(scroll_depth) FROM read_progress WHERE item_id = $1), 0), 0), 1)
            WHERE id = $1
            RETURNING view_count, save_count, support_count, comment_count,
                      unique_readers, reread_count, completion_rate
            "#,
        )
        .bind(id.into_inner())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(ReconcileReport {
            item_id: id,
            before: EngagementCounters::from(before),
            after: EngagementCounters::from(after),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgItemRepository>();
    }

    #[test]
    fn test_private_categories() {
        assert_eq!(private_categories(), vec!["unsent_letter".to_string()]);
    }

    #[test]
    fn test_order_clause_tie_breaks() {
        for order in [
            ItemOrder::RankScore,
            ItemOrder::Latest,
            ItemOrder::Trending,
            ItemOrder::MostViewed,
        ] {
            assert!(order_clause(order).ends_with("published_at DESC NULLS LAST, id DESC"));
        }
    }
}

//! Statements shared by the engagement transactions

use sqlx::PgConnection;
use story_core::traits::RepoResult;
use story_core::value_objects::{ActorId, ItemId};

use super::error::{item_not_found, map_db_error};

/// Lock a published item's row for the rest of the transaction and return its owner.
/// Missing and unpublished items are both reported as not found.
pub(super) async fn lock_published_item(
    conn: &mut PgConnection,
    item_id: ItemId,
) -> RepoResult<ActorId> {
    let owner_id = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT owner_id
        FROM items
        WHERE id = $1 AND status = 'published'
        FOR UPDATE
        "#,
    )
    .bind(item_id.into_inner())
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)?;

    owner_id
        .map(ActorId::new)
        .ok_or_else(|| item_not_found(item_id))
}

/// Add `delta` to a counter column, flooring at zero, and return the new value
pub(super) async fn bump_counter(
    conn: &mut PgConnection,
    item_id: ItemId,
    column: CounterColumn,
    delta: i64,
) -> RepoResult<i64> {
    let sql = format!(
        "UPDATE items SET {col} = GREATEST({col} + $2, 0) WHERE id = $1 RETURNING {col}",
        col = column.as_str()
    );

    sqlx::query_scalar::<_, i64>(&sql)
        .bind(item_id.into_inner())
        .bind(delta)
        .fetch_one(&mut *conn)
        .await
        .map_err(map_db_error)
}

/// Read a counter column without changing it
pub(super) async fn read_counter(
    conn: &mut PgConnection,
    item_id: ItemId,
    column: CounterColumn,
) -> RepoResult<i64> {
    let sql = format!("SELECT {} FROM items WHERE id = $1", column.as_str());

    sqlx::query_scalar::<_, i64>(&sql)
        .bind(item_id.into_inner())
        .fetch_one(&mut *conn)
        .await
        .map_err(map_db_error)
}

/// Integer counter columns a toggle may adjust
#[derive(Debug, Clone, Copy)]
pub(super) enum CounterColumn {
    Support,
    Save,
    Comment,
}

impl CounterColumn {
    fn as_str(self) -> &'static str {
        match self {
            Self::Support => "support_count",
            Self::Save => "save_count",
            Self::Comment => "comment_count",
        }
    }
}

//! Bookmark database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for bookmarks table
#[derive(Debug, Clone, FromRow)]
pub struct BookmarkModel {
    pub actor_id: i64,
    pub item_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Bookmark existence joined with the item's save count
#[derive(Debug, Clone, Copy, FromRow)]
pub struct BookmarkStatusModel {
    pub is_bookmarked: bool,
    pub save_count: i64,
}

//! Comment database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for comments table
#[derive(Debug, Clone, FromRow)]
pub struct CommentModel {
    pub id: i64,
    pub item_id: i64,
    pub actor_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

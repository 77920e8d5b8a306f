//! Read progress database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for read_progress table
#[derive(Debug, Clone, FromRow)]
pub struct ReadProgressModel {
    pub actor_id: i64,
    pub item_id: i64,
    pub scroll_depth: f64,
    pub time_spent_seconds: i64,
    pub completed: bool,
    pub read_count: i64,
    pub first_read_at: DateTime<Utc>,
    pub last_read_at: DateTime<Utc>,
}

//! Item database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for items table
#[derive(Debug, Clone, FromRow)]
pub struct ItemModel {
    pub id: i64,
    pub owner_id: i64,
    pub category: String,
    pub status: String,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub save_count: i64,
    pub support_count: i64,
    pub comment_count: i64,
    pub unique_readers: i64,
    pub reread_count: i64,
    pub completion_rate: f64,
    pub rank_score: f64,
    pub last_ranked_at: Option<DateTime<Utc>>,
}

/// Counter columns only (from `RETURNING` or reconciliation)
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CountersModel {
    pub view_count: i64,
    pub save_count: i64,
    pub support_count: i64,
    pub comment_count: i64,
    pub unique_readers: i64,
    pub reread_count: i64,
    pub completion_rate: f64,
}

/// Counters touched by a read event
#[derive(Debug, Clone, Copy, FromRow)]
pub struct ReadCountersModel {
    pub view_count: i64,
    pub unique_readers: i64,
    pub reread_count: i64,
    pub completion_rate: f64,
}

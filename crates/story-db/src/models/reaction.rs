//! Reaction database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub actor_id: i64,
    pub item_id: i64,
    pub reaction_type: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

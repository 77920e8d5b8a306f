//! ReadProgress entity <-> model mapper

use chrono::{DateTime, Utc};
use story_core::entities::ReadProgress;
use story_core::value_objects::{ActorId, ItemId};

use crate::models::ReadProgressModel;

impl From<ReadProgressModel> for ReadProgress {
    fn from(model: ReadProgressModel) -> Self {
        ReadProgress {
            actor_id: ActorId::new(model.actor_id),
            item_id: ItemId::new(model.item_id),
            scroll_depth: model.scroll_depth,
            time_spent_seconds: model.time_spent_seconds,
            completed: model.completed,
            read_count: model.read_count,
            first_read_at: model.first_read_at,
            last_read_at: model.last_read_at,
        }
    }
}

/// Values bound when inserting or updating a read_progress row
pub struct ReadProgressWrite {
    pub actor_id: i64,
    pub item_id: i64,
    pub scroll_depth: f64,
    pub time_spent_seconds: i64,
    pub completed: bool,
    pub read_count: i64,
    pub first_read_at: DateTime<Utc>,
    pub last_read_at: DateTime<Utc>,
}

impl ReadProgressWrite {
    pub fn new(progress: &ReadProgress) -> Self {
        Self {
            actor_id: progress.actor_id.into_inner(),
            item_id: progress.item_id.into_inner(),
            scroll_depth: progress.scroll_depth,
            time_spent_seconds: progress.time_spent_seconds,
            completed: progress.completed,
            read_count: progress.read_count,
            first_read_at: progress.first_read_at,
            last_read_at: progress.last_read_at,
        }
    }
}

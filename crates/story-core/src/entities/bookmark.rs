//! Bookmark entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ActorId, ItemId};

/// An actor's saved item. Existence of the row means "bookmarked".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub actor_id: ActorId,
    pub item_id: ItemId,
    pub created_at: DateTime<Utc>,
}

/// Bookmark state after a toggle or lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkOutcome {
    pub is_bookmarked: bool,
    pub save_count: i64,
}

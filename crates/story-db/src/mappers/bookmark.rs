//! Bookmark entity <-> model mapper

use story_core::entities::Bookmark;
use story_core::value_objects::{ActorId, ItemId};

use crate::models::BookmarkModel;

impl From<BookmarkModel> for Bookmark {
    fn from(model: BookmarkModel) -> Self {
        Bookmark {
            actor_id: ActorId::new(model.actor_id),
            item_id: ItemId::new(model.item_id),
            created_at: model.created_at,
        }
    }
}

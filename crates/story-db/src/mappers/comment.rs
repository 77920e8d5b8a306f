//! Comment entity <-> model mapper

use story_core::entities::Comment;
use story_core::value_objects::{ActorId, CommentId, ItemId};

use crate::models::CommentModel;

impl From<CommentModel> for Comment {
    fn from(model: CommentModel) -> Self {
        Comment {
            id: CommentId::new(model.id),
            item_id: ItemId::new(model.item_id),
            actor_id: ActorId::new(model.actor_id),
            parent_id: model.parent_id.map(CommentId::new),
            content: model.content,
            created_at: model.created_at,
        }
    }
}

//! Notifications emitted to item owners when someone engages with their story
//!
//! Delivery is fire-and-forget: the engagement operation has already
//! committed by the time a notification is built.

use serde::{Deserialize, Serialize};

use crate::entities::ReactionType;
use crate::value_objects::{ActorId, CommentId, ItemId};

/// Maximum characters of comment text carried in a notification
pub const COMMENT_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngagementNotification {
    ReactionAdded {
        owner_id: ActorId,
        item_id: ItemId,
        actor_id: ActorId,
        reaction_type: ReactionType,
    },
    CommentAdded {
        owner_id: ActorId,
        item_id: ItemId,
        actor_id: ActorId,
        comment_id: CommentId,
        preview: String,
    },
}

impl EngagementNotification {
    /// Recipient of the notification
    pub fn owner_id(&self) -> ActorId {
        match self {
            Self::ReactionAdded { owner_id, .. } | Self::CommentAdded { owner_id, .. } => *owner_id,
        }
    }

    /// Event name used on the wire
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::ReactionAdded { .. } => "REACTION_ADDED",
            Self::CommentAdded { .. } => "COMMENT_ADDED",
        }
    }
}

//! Reaction entity <-> model mapper

use story_core::entities::{Reaction, ReactionRequest};
use story_core::error::DomainError;
use story_core::value_objects::{ActorId, ItemId};

use crate::models::ReactionModel;

/// Convert ReactionModel to Reaction entity
impl TryFrom<ReactionModel> for Reaction {
    type Error = DomainError;

    fn try_from(model: ReactionModel) -> Result<Self, Self::Error> {
        Ok(Reaction {
            actor_id: ActorId::new(model.actor_id),
            item_id: ItemId::new(model.item_id),
            reaction_type: model.reaction_type.parse()?,
            message: model.message,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Values bound when inserting or rewriting a reaction row
pub struct ReactionInsert<'a> {
    pub actor_id: i64,
    pub item_id: i64,
    pub reaction_type: &'static str,
    pub message: Option<&'a str>,
}

impl<'a> ReactionInsert<'a> {
    pub fn new(request: &'a ReactionRequest) -> Self {
        Self {
            actor_id: request.actor_id.into_inner(),
            item_id: request.item_id.into_inner(),
            reaction_type: request.reaction_type.as_str(),
            message: request.message.as_deref(),
        }
    }
}

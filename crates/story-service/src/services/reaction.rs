//! Reaction service
//!
//! One reaction per actor per item: the same type again removes it, a
//! different type swaps it in place without touching `support_count`.

use story_core::events::EngagementNotification;
use story_core::{ActorId, ItemId, ReactionAction, ReactionRequest};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{ActorReactionResponse, ReactionResponse, ToggleReactionRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::notify::dispatch;
use super::retry::with_conflict_retry;

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add, remove, or change the actor's reaction on an item
    #[instrument(skip(self, request))]
    pub async fn toggle_reaction(
        &self,
        actor_id: ActorId,
        item_id: ItemId,
        request: ToggleReactionRequest,
    ) -> ServiceResult<ReactionResponse> {
        request.validate()?;

        let mut toggle = ReactionRequest::new(actor_id, item_id, request.reaction_type);
        if let Some(message) = request.message.filter(|m| !m.trim().is_empty()) {
            toggle = toggle.with_message(message);
        }

        let outcome = with_conflict_retry(|| self.ctx.reaction_repo().toggle(&toggle)).await?;

        info!(
            item_id = %item_id,
            actor_id = %actor_id,
            action = %outcome.action,
            support_count = outcome.support_count,
            "Reaction toggled"
        );

        if outcome.action == ReactionAction::Added && outcome.owner_id != actor_id {
            dispatch(
                self.ctx.notifier(),
                EngagementNotification::ReactionAdded {
                    owner_id: outcome.owner_id,
                    item_id,
                    actor_id,
                    reaction_type: toggle.reaction_type,
                },
            )
            .await;
        }

        Ok(ReactionResponse::from(outcome))
    }

    /// The actor's current reaction on an item
    #[instrument(skip(self))]
    pub async fn get_actor_reaction(
        &self,
        actor_id: ActorId,
        item_id: ItemId,
    ) -> ServiceResult<ActorReactionResponse> {
        let reaction = self.ctx.reaction_repo().find(actor_id, item_id).await?;
        Ok(ActorReactionResponse::from(reaction))
    }
}

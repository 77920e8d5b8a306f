//! Comment service
//!
//! Only the counter path of commenting lives here; editing and moderation
//! belong to the surrounding CRUD layer.

use story_core::events::{EngagementNotification, COMMENT_PREVIEW_CHARS};
use story_core::{ActorId, ItemId, NewComment};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CommentResponse, CreateCommentRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::notify::dispatch;

/// Comment service
pub struct CommentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommentService<'a> {
    /// Create a new CommentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Insert a comment and bump the item's `comment_count`
    #[instrument(skip(self, request))]
    pub async fn add_comment(
        &self,
        actor_id: ActorId,
        item_id: ItemId,
        request: CreateCommentRequest,
    ) -> ServiceResult<CommentResponse> {
        request.validate()?;

        let content = request.content.trim();
        if content.is_empty() {
            return Err(ServiceError::validation("Comment cannot be blank"));
        }

        let outcome = self
            .ctx
            .comment_repo()
            .create(&NewComment {
                item_id,
                actor_id,
                parent_id: request.parent_id,
                content: content.to_string(),
            })
            .await?;

        info!(
            item_id = %item_id,
            actor_id = %actor_id,
            comment_id = %outcome.comment.id,
            comment_count = outcome.comment_count,
            "Comment added"
        );

        if outcome.owner_id != actor_id {
            dispatch(
                self.ctx.notifier(),
                EngagementNotification::CommentAdded {
                    owner_id: outcome.owner_id,
                    item_id,
                    actor_id,
                    comment_id: outcome.comment.id,
                    preview: outcome.comment.preview(COMMENT_PREVIEW_CHARS).to_string(),
                },
            )
            .await;
        }

        Ok(CommentResponse::from(outcome))
    }
}

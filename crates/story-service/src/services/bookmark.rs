//! Bookmark service

use story_core::ranking::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use story_core::{ActorId, ItemId};
use tracing::{info, instrument};

use crate::dto::{
    BookmarkResponse, BookmarkedItemResponse, ListBookmarksParams, PaginatedResponse,
    PaginationMeta,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::retry::with_conflict_retry;

/// Bookmark service
pub struct BookmarkService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BookmarkService<'a> {
    /// Create a new BookmarkService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Flip the actor's bookmark on an item
    #[instrument(skip(self))]
    pub async fn toggle_bookmark(
        &self,
        actor_id: ActorId,
        item_id: ItemId,
    ) -> ServiceResult<BookmarkResponse> {
        let outcome =
            with_conflict_retry(|| self.ctx.bookmark_repo().toggle(actor_id, item_id)).await?;

        info!(
            item_id = %item_id,
            actor_id = %actor_id,
            is_bookmarked = outcome.is_bookmarked,
            save_count = outcome.save_count,
            "Bookmark toggled"
        );

        Ok(BookmarkResponse::from(outcome))
    }

    #[instrument(skip(self))]
    pub async fn bookmark_status(
        &self,
        actor_id: ActorId,
        item_id: ItemId,
    ) -> ServiceResult<BookmarkResponse> {
        let outcome = self.ctx.bookmark_repo().status(actor_id, item_id).await?;
        Ok(BookmarkResponse::from(outcome))
    }

    /// The actor's bookmarks on published items, newest first
    #[instrument(skip(self))]
    pub async fn list_bookmarks(
        &self,
        actor_id: ActorId,
        params: ListBookmarksParams,
    ) -> ServiceResult<PaginatedResponse<BookmarkedItemResponse>> {
        let page = params.page.unwrap_or(1).max(1);
        let per_page = params
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let offset = i64::from(page - 1) * i64::from(per_page);

        let repo = self.ctx.bookmark_repo();
        let total = repo.count_by_actor(actor_id).await?;
        let bookmarks = repo
            .find_by_actor(actor_id, offset, i64::from(per_page))
            .await?;

        Ok(PaginatedResponse {
            data: bookmarks
                .into_iter()
                .map(BookmarkedItemResponse::from)
                .collect(),
            pagination: PaginationMeta::new(total, page, per_page),
        })
    }
}

//! Read progress service

use chrono::{DateTime, Utc};
use story_core::{ActorId, ItemId, ReadSample, ReadSignal};
use tracing::{debug, instrument};
use validator::Validate;

use crate::dto::{ReadProgressResponse, ReadProgressView, RecordReadRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::retry::with_conflict_retry;

/// Read progress service
pub struct ReadProgressService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReadProgressService<'a> {
    /// Create a new ReadProgressService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a view, and for signed-in actors merge the read into their progress
    pub async fn record_read(
        &self,
        actor_id: Option<ActorId>,
        item_id: ItemId,
        request: RecordReadRequest,
    ) -> ServiceResult<ReadProgressResponse> {
        self.record_read_at(actor_id, item_id, request, Utc::now())
            .await
    }

    /// [`record_read`](Self::record_read) with an explicit clock
    #[instrument(skip(self, request, now))]
    pub async fn record_read_at(
        &self,
        actor_id: Option<ActorId>,
        item_id: ItemId,
        request: RecordReadRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<ReadProgressResponse> {
        request.validate()?;

        let signal = match actor_id {
            None => ReadSignal::AnonymousView { item_id },
            Some(actor_id) => ReadSignal::AuthenticatedRead {
                actor_id,
                item_id,
                sample: ReadSample::new(request.scroll_depth, request.time_spent_seconds),
            },
        };

        let outcome =
            with_conflict_retry(|| self.ctx.read_progress_repo().record(&signal, now)).await?;

        debug!(
            item_id = %item_id,
            view_count = outcome.view_count,
            unique_readers = outcome.unique_readers,
            is_new_reader = outcome.is_new_reader,
            "Read recorded"
        );

        Ok(ReadProgressResponse::from(outcome))
    }

    #[instrument(skip(self))]
    pub async fn get_read_progress(
        &self,
        actor_id: ActorId,
        item_id: ItemId,
    ) -> ServiceResult<Option<ReadProgressView>> {
        let progress = self.ctx.read_progress_repo().find(actor_id, item_id).await?;
        Ok(progress.as_ref().map(ReadProgressView::from))
    }
}

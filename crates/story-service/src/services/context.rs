//! Service context - dependency container for services
//!
//! Holds the counter store repositories and the notification sink.

use std::sync::Arc;

use story_core::traits::{
    BookmarkRepository, CommentRepository, ItemRepository, Notifier, ReactionRepository,
    ReadProgressRepository, MAX_BATCH_SIZE,
};
use story_db::{
    MemoryStore, PgBookmarkRepository, PgCommentRepository, PgItemRepository, PgPool,
    PgReactionRepository, PgReadProgressRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Items fetched per page by the batch recompute
pub const DEFAULT_RANKING_BATCH_SIZE: u32 = 500;

/// Service context containing all dependencies
///
/// Cloning is cheap: every dependency sits behind an `Arc`, so the same
/// context can be shared between request handlers and the scheduler.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    item_repo: Arc<dyn ItemRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    bookmark_repo: Arc<dyn BookmarkRepository>,
    read_progress_repo: Arc<dyn ReadProgressRepository>,
    comment_repo: Arc<dyn CommentRepository>,

    // Notifications
    notifier: Arc<dyn Notifier>,

    ranking_batch_size: u32,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        item_repo: Arc<dyn ItemRepository>,
        reaction_repo: Arc<dyn ReactionRepository>,
        bookmark_repo: Arc<dyn BookmarkRepository>,
        read_progress_repo: Arc<dyn ReadProgressRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            item_repo,
            reaction_repo,
            bookmark_repo,
            read_progress_repo,
            comment_repo,
            notifier,
            ranking_batch_size: DEFAULT_RANKING_BATCH_SIZE,
        }
    }

    /// Context backed by PostgreSQL repositories sharing one pool
    pub fn postgres(pool: PgPool, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(
            Arc::new(PgItemRepository::new(pool.clone())),
            Arc::new(PgReactionRepository::new(pool.clone())),
            Arc::new(PgBookmarkRepository::new(pool.clone())),
            Arc::new(PgReadProgressRepository::new(pool.clone())),
            Arc::new(PgCommentRepository::new(pool)),
            notifier,
        )
    }

    /// Context where every repository is the same in-process store
    pub fn in_memory(store: Arc<MemoryStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            notifier,
        )
    }

    /// Override the batch recompute page size, clamped to 1..=[`MAX_BATCH_SIZE`]
    /// so a full page from the store always means "maybe more"
    #[must_use]
    pub fn with_ranking_batch_size(mut self, batch_size: u32) -> Self {
        self.ranking_batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    // === Repositories ===

    pub fn item_repo(&self) -> &dyn ItemRepository {
        self.item_repo.as_ref()
    }

    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    pub fn bookmark_repo(&self) -> &dyn BookmarkRepository {
        self.bookmark_repo.as_ref()
    }

    pub fn read_progress_repo(&self) -> &dyn ReadProgressRepository {
        self.read_progress_repo.as_ref()
    }

    pub fn comment_repo(&self) -> &dyn CommentRepository {
        self.comment_repo.as_ref()
    }

    // === Notifications ===

    /// Get the owner notification sink
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Page size used by the batch recompute
    pub fn ranking_batch_size(&self) -> u32 {
        self.ranking_batch_size
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("ranking_batch_size", &self.ranking_batch_size)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    item_repo: Option<Arc<dyn ItemRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    bookmark_repo: Option<Arc<dyn BookmarkRepository>>,
    read_progress_repo: Option<Arc<dyn ReadProgressRepository>>,
    comment_repo: Option<Arc<dyn CommentRepository>>,
    notifier: Option<Arc<dyn Notifier>>,
    ranking_batch_size: Option<u32>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_repo(mut self, repo: Arc<dyn ItemRepository>) -> Self {
        self.item_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn bookmark_repo(mut self, repo: Arc<dyn BookmarkRepository>) -> Self {
        self.bookmark_repo = Some(repo);
        self
    }

    pub fn read_progress_repo(mut self, repo: Arc<dyn ReadProgressRepository>) -> Self {
        self.read_progress_repo = Some(repo);
        self
    }

    pub fn comment_repo(mut self, repo: Arc<dyn CommentRepository>) -> Self {
        self.comment_repo = Some(repo);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn ranking_batch_size(mut self, batch_size: u32) -> Self {
        self.ranking_batch_size = Some(batch_size);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let ctx = ServiceContext::new(
            self.item_repo
                .ok_or_else(|| ServiceError::validation("item_repo is required"))?,
            self.reaction_repo
                .ok_or_else(|| ServiceError::validation("reaction_repo is required"))?,
            self.bookmark_repo
                .ok_or_else(|| ServiceError::validation("bookmark_repo is required"))?,
            self.read_progress_repo
                .ok_or_else(|| ServiceError::validation("read_progress_repo is required"))?,
            self.comment_repo
                .ok_or_else(|| ServiceError::validation("comment_repo is required"))?,
            self.notifier
                .ok_or_else(|| ServiceError::validation("notifier is required"))?,
        );

        Ok(match self.ranking_batch_size {
            Some(size) => ctx.with_ranking_batch_size(size),
            None => ctx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NoopNotifier;

    #[test]
    fn test_builder_requires_dependencies() {
        let err = ServiceContextBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("item_repo is required"));
    }

    #[test]
    fn test_builder_with_memory_store() {
        let store = Arc::new(MemoryStore::new());
        let ctx = ServiceContextBuilder::new()
            .item_repo(store.clone())
            .reaction_repo(store.clone())
            .bookmark_repo(store.clone())
            .read_progress_repo(store.clone())
            .comment_repo(store)
            .notifier(Arc::new(NoopNotifier))
            .ranking_batch_size(0)
            .build()
            .unwrap();

        assert_eq!(ctx.ranking_batch_size(), 1);
    }

    #[test]
    fn test_batch_size_capped_at_store_page_limit() {
        let ctx = ServiceContext::in_memory(Arc::new(MemoryStore::new()), Arc::new(NoopNotifier))
            .with_ranking_batch_size(20_000);
        assert_eq!(ctx.ranking_batch_size(), MAX_BATCH_SIZE);
    }

    #[test]
    fn test_in_memory_default_batch_size() {
        let ctx = ServiceContext::in_memory(Arc::new(MemoryStore::new()), Arc::new(NoopNotifier));
        assert_eq!(ctx.ranking_batch_size(), DEFAULT_RANKING_BATCH_SIZE);
    }
}

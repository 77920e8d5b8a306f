//! Repository traits (ports) - define the interface for data access
//!
//! Every mutating method is one atomic unit: the per-(actor, item) row
//! change and the item counter update either both commit or neither does.
//! Engagement methods require the item to exist with `status = published`
//! and return [`DomainError::ItemNotFound`] otherwise, without mutating
//! anything.
//!
//! [`DomainError::ItemNotFound`]: crate::error::DomainError::ItemNotFound

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Bookmark, BookmarkOutcome, CommentOutcome, Item, NewComment, Reaction, ReactionOutcome,
    ReactionRequest, ReadOutcome, ReadProgress, ReadSignal, ReconcileReport,
};
use crate::error::DomainError;
use crate::ranking::{ItemFilter, ItemOrder};
use crate::value_objects::{ActorId, ItemId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Largest page any store returns from the id-cursor scans
/// (`published_batch`, `item_ids_after`)
pub const MAX_BATCH_SIZE: u32 = 10_000;

// ============================================================================
// Item Repository
// ============================================================================

#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Find item by ID, in any status
    async fn find_by_id(&self, id: ItemId) -> RepoResult<Option<Item>>;

    /// All published items matching the filter, in no particular order
    async fn find_published(&self, filter: ItemFilter) -> RepoResult<Vec<Item>>;

    /// One page of published items sorted by `order`
    async fn page_published(
        &self,
        filter: ItemFilter,
        order: ItemOrder,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Item>>;

    /// Number of published items matching the filter
    async fn count_published(&self, filter: ItemFilter) -> RepoResult<i64>;

    /// Published items with `id > after`, ascending by id.
    /// `limit` is clamped to 1..=[`MAX_BATCH_SIZE`].
    async fn published_batch(&self, after: Option<ItemId>, limit: i64) -> RepoResult<Vec<Item>>;

    /// Published items matching the filter that have never been scored
    /// (`last_ranked_at` unset), ascending by id.
    /// `limit` is clamped to 1..=[`MAX_BATCH_SIZE`].
    async fn unranked_published(&self, filter: ItemFilter, limit: i64) -> RepoResult<Vec<Item>>;

    /// Persist a freshly computed score as a single-row update.
    /// Returns false if the item is gone or no longer published.
    async fn update_rank_score(
        &self,
        id: ItemId,
        score: f64,
        ranked_at: DateTime<Utc>,
    ) -> RepoResult<bool>;

    /// Item ids (any status) with `id > after`, ascending.
    /// `limit` is clamped to 1..=[`MAX_BATCH_SIZE`].
    async fn item_ids_after(&self, after: Option<ItemId>, limit: i64) -> RepoResult<Vec<ItemId>>;

    /// Recompute every derivable counter from source rows.
    /// `view_count` has no source rows and is left as is.
    async fn reconcile_counters(&self, id: ItemId) -> RepoResult<ReconcileReport>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// The actor's single reaction on the item, if any
    async fn find(&self, actor_id: ActorId, item_id: ItemId) -> RepoResult<Option<Reaction>>;

    /// Add, remove, or change the actor's reaction and adjust `support_count`.
    /// A lost insert race surfaces as `EngagementConflict`.
    async fn toggle(&self, request: &ReactionRequest) -> RepoResult<ReactionOutcome>;
}

// ============================================================================
// Bookmark Repository
// ============================================================================

#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Current bookmark state and the item's `save_count`
    async fn status(&self, actor_id: ActorId, item_id: ItemId) -> RepoResult<BookmarkOutcome>;

    /// Flip the bookmark and adjust `save_count`.
    /// A lost insert race surfaces as `EngagementConflict`.
    async fn toggle(&self, actor_id: ActorId, item_id: ItemId) -> RepoResult<BookmarkOutcome>;

    /// The actor's bookmarks on published items, newest first
    async fn find_by_actor(
        &self,
        actor_id: ActorId,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Bookmark>>;

    /// Number of the actor's bookmarks on published items
    async fn count_by_actor(&self, actor_id: ActorId) -> RepoResult<i64>;
}

// ============================================================================
// Read Progress Repository
// ============================================================================

#[async_trait]
pub trait ReadProgressRepository: Send + Sync {
    async fn find(&self, actor_id: ActorId, item_id: ItemId) -> RepoResult<Option<ReadProgress>>;

    /// Apply a read signal: bump views and, for authenticated reads, merge
    /// the progress row and refresh `unique_readers`, `reread_count` and
    /// `completion_rate`. A lost first-read race surfaces as `EngagementConflict`.
    async fn record(&self, signal: &ReadSignal, now: DateTime<Utc>) -> RepoResult<ReadOutcome>;
}

// ============================================================================
// Comment Repository
// ============================================================================

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert the comment and increment `comment_count` together
    async fn create(&self, comment: &NewComment) -> RepoResult<CommentOutcome>;
}

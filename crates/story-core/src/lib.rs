//! # story-core
//!
//! Domain layer of the engagement and ranking engine: entities, the pure
//! state machines behind reaction/bookmark/read toggles, the gravity-decay
//! ranking formula, notifications, and repository traits.
//! This crate has zero dependencies on infrastructure (database, cache, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod ranking;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    completion_rate, Bookmark, BookmarkOutcome, Category, Comment, CommentOutcome,
    EngagementCounters, Item, ItemStatus, NewComment, Reaction, ReactionAction, ReactionOutcome,
    ReactionRequest, ReactionType, ReadOutcome, ReadProgress, ReadSample, ReadSignal,
    ReconcileReport, COMPLETION_THRESHOLD, MAX_TIME_SPENT_SECONDS,
};
pub use error::{DomainError, EngagementKind};
pub use events::{EngagementNotification, COMMENT_PREVIEW_CHARS};
pub use ranking::{
    age_hours, engagement_points, gravity_score, rank_by_gravity, score_item, FeedQuery,
    FeedSort, ItemFilter, ItemOrder, RankedItem, RankingAlgorithm, RankingPath, GRAVITY,
};
pub use traits::{
    BookmarkRepository, CommentRepository, ItemRepository, Notifier, ReactionRepository,
    ReadProgressRepository, RepoResult, MAX_BATCH_SIZE,
};
pub use value_objects::{ActorId, CommentId, IdParseError, ItemId};

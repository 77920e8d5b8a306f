//! # story-service
//!
//! Application layer of the engagement engine: the use cases behind
//! reactions, bookmarks, read tracking, comments, feed ranking and counter
//! reconciliation, plus the periodic ranking scheduler.

pub mod bootstrap;
pub mod dto;
pub mod scheduler;
pub mod services;

pub use bootstrap::build_context;
pub use scheduler::{RankingScheduler, SchedulerHandle};
pub use services::{
    BookmarkService, CommentService, NoopNotifier, RankingService, ReactionService,
    ReadProgressService, RecomputeSummary, ReconcileService, ReconcileSummary, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, MAX_CONFLICT_RETRIES,
};

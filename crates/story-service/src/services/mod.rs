//! Engagement services
//!
//! Each service borrows the [`ServiceContext`] for the duration of a call and
//! owns no state of its own.

pub mod bookmark;
pub mod comment;
pub mod context;
pub mod error;
pub mod notify;
pub mod ranking;
pub mod reaction;
pub mod read_progress;
pub mod reconcile;
pub mod retry;

pub use bookmark::BookmarkService;
pub use comment::CommentService;
pub use context::{ServiceContext, ServiceContextBuilder, DEFAULT_RANKING_BATCH_SIZE};
pub use error::{ServiceError, ServiceResult};
pub use notify::NoopNotifier;
pub use ranking::{RankingService, RecomputeSummary};
pub use reaction::ReactionService;
pub use read_progress::ReadProgressService;
pub use reconcile::{ReconcileService, ReconcileSummary};
pub use retry::MAX_CONFLICT_RETRIES;

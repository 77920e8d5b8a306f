//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in story-core.
//! Every engagement mutation runs in one transaction that first locks the
//! published item row, so the per-(actor, item) row change and the counter
//! update commit together or not at all.

mod bookmark;
mod comment;
mod error;
mod item;
mod reaction;
mod read_progress;
mod tx;

pub use bookmark::PgBookmarkRepository;
pub use comment::PgCommentRepository;
pub use item::PgItemRepository;
pub use reaction::PgReactionRepository;
pub use read_progress::PgReadProgressRepository;

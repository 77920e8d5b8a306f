//! Domain entities - core business objects

mod bookmark;
mod comment;
mod item;
mod reaction;
mod read_progress;

pub use bookmark::{Bookmark, BookmarkOutcome};
pub use comment::{Comment, CommentOutcome, NewComment};
pub use item::{Category, EngagementCounters, Item, ItemStatus, ReconcileReport};
pub use reaction::{Reaction, ReactionAction, ReactionOutcome, ReactionRequest, ReactionType};
pub use read_progress::{
    completion_rate, ReadOutcome, ReadProgress, ReadSample, ReadSignal, COMPLETION_THRESHOLD,
    MAX_TIME_SPENT_SECONDS,
};

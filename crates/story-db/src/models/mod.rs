//! Database models - SQLx-compatible structs for PostgreSQL tables

mod bookmark;
mod comment;
mod item;
mod reaction;
mod read_progress;

pub use bookmark::{BookmarkModel, BookmarkStatusModel};
pub use comment::CommentModel;
pub use item::{CountersModel, ItemModel, ReadCountersModel};
pub use reaction::ReactionModel;
pub use read_progress::ReadProgressModel;

//! Repository traits (ports) - define the interface for the counter store

mod notifier;
mod repositories;

pub use notifier::Notifier;
pub use repositories::{
    BookmarkRepository, CommentRepository, ItemRepository, ReactionRepository,
    ReadProgressRepository, RepoResult, MAX_BATCH_SIZE,
};

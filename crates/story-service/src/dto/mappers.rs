//! Domain entity to DTO conversions

use story_core::{
    Bookmark, BookmarkOutcome, CommentOutcome, Item, Reaction, ReactionOutcome, ReadOutcome,
    ReadProgress,
};

use super::responses::{
    ActorReactionResponse, BookmarkResponse, BookmarkedItemResponse, CommentResponse,
    FeedItemResponse, ReactionResponse, ReadProgressResponse, ReadProgressView,
};

impl From<ReactionOutcome> for ReactionResponse {
    fn from(outcome: ReactionOutcome) -> Self {
        Self {
            action: outcome.action,
            support_count: outcome.support_count,
            actor_reaction: outcome.actor_reaction,
        }
    }
}

impl From<Option<Reaction>> for ActorReactionResponse {
    fn from(reaction: Option<Reaction>) -> Self {
        let reaction_type = reaction.map(|r| r.reaction_type);
        Self {
            reaction_type,
            has_reacted: reaction_type.is_some(),
        }
    }
}

impl From<BookmarkOutcome> for BookmarkResponse {
    fn from(outcome: BookmarkOutcome) -> Self {
        Self {
            is_bookmarked: outcome.is_bookmarked,
            save_count: outcome.save_count,
        }
    }
}

impl From<Bookmark> for BookmarkedItemResponse {
    fn from(bookmark: Bookmark) -> Self {
        Self {
            item_id: bookmark.item_id,
            created_at: bookmark.created_at,
        }
    }
}

impl From<&ReadProgress> for ReadProgressView {
    fn from(progress: &ReadProgress) -> Self {
        Self {
            scroll_depth: progress.scroll_depth,
            time_spent_seconds: progress.time_spent_seconds,
            completed: progress.completed,
            read_count: progress.read_count,
            first_read_at: progress.first_read_at,
            last_read_at: progress.last_read_at,
        }
    }
}

impl From<ReadOutcome> for ReadProgressResponse {
    fn from(outcome: ReadOutcome) -> Self {
        Self {
            view_count: outcome.view_count,
            unique_readers: outcome.unique_readers,
            reread_count: outcome.reread_count,
            completion_rate: outcome.completion_rate,
            is_new_reader: outcome.is_new_reader,
            progress: outcome.progress.as_ref().map(ReadProgressView::from),
        }
    }
}

impl From<CommentOutcome> for CommentResponse {
    fn from(outcome: CommentOutcome) -> Self {
        let comment = outcome.comment;
        Self {
            id: comment.id,
            item_id: comment.item_id,
            actor_id: comment.actor_id,
            parent_id: comment.parent_id,
            content: comment.content,
            created_at: comment.created_at,
            comment_count: outcome.comment_count,
        }
    }
}

impl FeedItemResponse {
    /// Feed entry for an item, with the score it was ordered by
    pub fn new(item: &Item, score: Option<f64>) -> Self {
        Self {
            id: item.id,
            owner_id: item.owner_id,
            category: item.category,
            published_at: item.published_at,
            view_count: item.counters.view_count,
            save_count: item.counters.save_count,
            support_count: item.counters.support_count,
            comment_count: item.counters.comment_count,
            score,
        }
    }
}

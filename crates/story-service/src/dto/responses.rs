//! Response DTOs
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Identifiers are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

use story_core::ranking::RankingAlgorithm;
use story_core::{ActorId, Category, CommentId, ItemId, ReactionAction, ReactionType};

// ============================================================================
// Common Response Types
// ============================================================================

/// Page-numbered response
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, page: u32, per_page: u32) -> Self {
        let total = total.max(0);
        let per_page = per_page.max(1);
        let total_pages = (total + i64::from(per_page) - 1) / i64::from(per_page);
        Self {
            total,
            page,
            per_page,
            total_pages,
            has_next: i64::from(page) < total_pages,
            has_prev: page > 1,
        }
    }
}

// ============================================================================
// Reaction Responses
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReactionResponse {
    pub action: ReactionAction,
    pub support_count: i64,
    pub actor_reaction: Option<ReactionType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActorReactionResponse {
    pub reaction_type: Option<ReactionType>,
    pub has_reacted: bool,
}

// ============================================================================
// Bookmark Responses
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookmarkResponse {
    pub is_bookmarked: bool,
    pub save_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkedItemResponse {
    pub item_id: ItemId,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Read Progress Responses
// ============================================================================

/// One actor's merged reading record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadProgressView {
    pub scroll_depth: f64,
    pub time_spent_seconds: i64,
    pub completed: bool,
    pub read_count: i64,
    pub first_read_at: DateTime<Utc>,
    pub last_read_at: DateTime<Utc>,
}

/// Item counters after a read signal, plus the actor's record if any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadProgressResponse {
    pub view_count: i64,
    pub unique_readers: i64,
    pub reread_count: i64,
    pub completion_rate: f64,
    pub is_new_reader: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ReadProgressView>,
}

// ============================================================================
// Comment Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentResponse {
    pub id: CommentId,
    pub item_id: ItemId,
    pub actor_id: ActorId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Item `comment_count` after the insert
    pub comment_count: i64,
}

// ============================================================================
// Feed Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItemResponse {
    pub id: ItemId,
    pub owner_id: ActorId,
    pub category: Category,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub save_count: i64,
    pub support_count: i64,
    pub comment_count: i64,
    /// Score the item was ordered by; absent outside gravity feeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedResponse {
    pub items: Vec<FeedItemResponse>,
    pub pagination: PaginationMeta,
    pub ranking_algorithm: RankingAlgorithm,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(45, 2, 20);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let last = PaginationMeta::new(45, 3, 20);
        assert!(!last.has_next);

        let empty = PaginationMeta::new(0, 1, 20);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }

    #[test]
    fn test_reaction_response_serialization() {
        let response = ReactionResponse {
            action: ReactionAction::Removed,
            support_count: 0,
            actor_reaction: None,
        };
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["action"], "removed");
        assert!(json["actor_reaction"].is_null());
    }

    #[test]
    fn test_feed_response_reports_algorithm() {
        let response = FeedResponse {
            items: Vec::new(),
            pagination: PaginationMeta::new(0, 1, 20),
            ranking_algorithm: RankingAlgorithm::MostViewed,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ranking_algorithm"], "most_viewed");
    }
}

//! Request DTOs
//!
//! All request DTOs implement `Deserialize`; bodies also implement `Validate`.

use serde::Deserialize;
use validator::Validate;

use story_core::ranking::{FeedQuery, FeedSort, RankingPath, DEFAULT_PER_PAGE};
use story_core::{Category, CommentId, ReactionType};

// ============================================================================
// Engagement Requests
// ============================================================================

/// Toggle reaction request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ToggleReactionRequest {
    /// Defaults to `heart`
    #[serde(default)]
    pub reaction_type: ReactionType,

    #[validate(length(max = 500, message = "Message must be at most 500 characters"))]
    pub message: Option<String>,
}

/// Read progress signal
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RecordReadRequest {
    #[validate(range(min = 0.0, max = 1.0, message = "Scroll depth must be between 0 and 1"))]
    pub scroll_depth: Option<f64>,

    #[validate(range(
        min = 0,
        max = 86_400,
        message = "Time spent must be between 0 and 86400 seconds"
    ))]
    pub time_spent_seconds: Option<i64>,
}

/// Create comment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"))]
    pub content: String,

    /// Comment being replied to
    pub parent_id: Option<CommentId>,
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Feed query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct FeedParams {
    pub category: Option<Category>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Defaults to `smart`
    pub sort_by: Option<FeedSort>,
    /// Defaults to the cached score
    pub path: Option<RankingPath>,
}

impl From<FeedParams> for FeedQuery {
    fn from(params: FeedParams) -> Self {
        FeedQuery::new(
            params.category,
            params.page.unwrap_or(1),
            params.per_page.unwrap_or(DEFAULT_PER_PAGE),
        )
        .with_sort(params.sort_by.unwrap_or_default())
        .with_path(params.path.unwrap_or_default())
        .normalized()
    }
}

/// Bookmark listing parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListBookmarksParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

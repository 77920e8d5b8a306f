//! Data transfer objects for the engagement API
//!
//! This module provides:
//! - Request DTOs with validation for inputs from the HTTP collaborators
//! - Response DTOs carrying the result fields of each operation

pub mod mappers;
pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{
    CreateCommentRequest, FeedParams, ListBookmarksParams, RecordReadRequest,
    ToggleReactionRequest,
};

// Re-export commonly used response types
pub use responses::{
    ActorReactionResponse, BookmarkResponse, BookmarkedItemResponse, CommentResponse,
    FeedItemResponse, FeedResponse, PaginatedResponse, PaginationMeta, ReactionResponse,
    ReadProgressResponse, ReadProgressView,
};

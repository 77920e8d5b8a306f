//! Domain errors - error types for the domain layer

use std::fmt;
use thiserror::Error;

use crate::value_objects::{ActorId, CommentId, ItemId};

/// Which per-(actor, item) record a conflict was raised on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngagementKind {
    Reaction,
    Bookmark,
    ReadProgress,
}

impl fmt::Display for EngagementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reaction => "reaction",
            Self::Bookmark => "bookmark",
            Self::ReadProgress => "read_progress",
        })
    }
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    /// Item is missing or not published
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),

    #[error("Comment not found: {0}")]
    CommentNotFound(CommentId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid reaction type: {0}")]
    InvalidReactionType(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    /// A concurrent insert for the same (actor, item) won the race
    #[error("Concurrent {kind} write for actor {actor_id} on item {item_id}")]
    EngagementConflict {
        actor_id: ActorId,
        item_id: ItemId,
        kind: EngagementKind,
    },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Transient store error: {0}")]
    TransientStore(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ItemNotFound(_) => "UNKNOWN_ITEM",
            Self::ActorNotFound(_) => "UNKNOWN_ACTOR",
            Self::CommentNotFound(_) => "UNKNOWN_COMMENT",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::InvalidReactionType(_) => "INVALID_REACTION_TYPE",

            // Conflict
            Self::EngagementConflict { .. } => "ENGAGEMENT_CONFLICT",

            // Infrastructure
            Self::TransientStore(_) => "STORE_UNAVAILABLE",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ItemNotFound(_) | Self::ActorNotFound(_) | Self::CommentNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::InvalidCategory(_) | Self::InvalidReactionType(_)
        )
    }

    /// Check if this is a lost insert race
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::EngagementConflict { .. })
    }

    /// Whether the caller may safely retry the whole operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStore(_))
    }
}

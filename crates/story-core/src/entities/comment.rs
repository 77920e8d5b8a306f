//! Comment entity

use chrono::{DateTime, Utc};

use crate::value_objects::{ActorId, CommentId, ItemId};

/// Comment entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub item_id: ItemId,
    pub actor_id: ActorId,
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// First `max_chars` characters of the content, never splitting a code point
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.content[..idx],
            None => &self.content,
        }
    }
}

/// Data for inserting a new comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub item_id: ItemId,
    pub actor_id: ActorId,
    pub parent_id: Option<CommentId>,
    pub content: String,
}

/// Result of a committed comment insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentOutcome {
    pub comment: Comment,
    pub comment_count: i64,
    pub owner_id: ActorId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(content: &str) -> Comment {
        Comment {
            id: CommentId::new(1),
            item_id: ItemId::new(1),
            actor_id: ActorId::new(1),
            parent_id: None,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(comment("hello world").preview(5), "hello");
        assert_eq!(comment("short").preview(100), "short");
    }

    #[test]
    fn test_preview_multibyte() {
        let c = comment("고마워요 정말");
        assert_eq!(c.preview(4), "고마워요");
    }
}

//! Item entity - a published story with its denormalized engagement counters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{ActorId, ItemId};

/// Story category
///
/// `UnsentLetter` holds private disclosures and is exempt from
/// popularity ranking: it is always served in a fresh random order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Achievement,
    Regret,
    UnsentLetter,
    Sacrifice,
    LifeStory,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Achievement,
        Category::Regret,
        Category::UnsentLetter,
        Category::Sacrifice,
        Category::LifeStory,
        Category::Other,
    ];

    /// Storage / wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Achievement => "achievement",
            Self::Regret => "regret",
            Self::UnsentLetter => "unsent_letter",
            Self::Sacrifice => "sacrifice",
            Self::LifeStory => "life_story",
            Self::Other => "other",
        }
    }

    /// Whether items in this category must never be ordered by engagement
    #[inline]
    pub fn is_privacy_sensitive(self) -> bool {
        match self {
            Self::UnsentLetter => true,
            Self::Achievement | Self::Regret | Self::Sacrifice | Self::LifeStory | Self::Other => {
                false
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::InvalidCategory(s.to_string()))
    }
}

/// Publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Draft,
    Published,
    Flagged,
    Removed,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Flagged => "flagged",
            Self::Removed => "removed",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "flagged" => Ok(Self::Flagged),
            "removed" => Ok(Self::Removed),
            other => Err(DomainError::ValidationError(format!(
                "unknown item status: {other}"
            ))),
        }
    }
}

/// Denormalized engagement counters cached on the item row
///
/// The child rows (reactions, bookmarks, read progress, comments) are the
/// source of truth; these values are only ever written by the toggle and
/// aggregator paths or by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngagementCounters {
    pub view_count: i64,
    pub save_count: i64,
    pub support_count: i64,
    pub comment_count: i64,
    pub unique_readers: i64,
    pub reread_count: i64,
    /// Mean scroll depth over all read-progress rows, in [0, 1]
    pub completion_rate: f64,
}

/// Item entity
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub owner_id: ActorId,
    pub category: Category,
    pub status: ItemStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub counters: EngagementCounters,
    pub rank_score: f64,
    pub last_ranked_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Create a freshly published item with zeroed counters
    pub fn published(
        id: ItemId,
        owner_id: ActorId,
        category: Category,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            category,
            status: ItemStatus::Published,
            published_at: Some(published_at),
            counters: EngagementCounters::default(),
            rank_score: 0.0,
            last_ranked_at: None,
        }
    }

    /// Only published items accept engagement and appear in feeds
    #[inline]
    pub fn is_published(&self) -> bool {
        self.status == ItemStatus::Published
    }

    /// Whether the persisted score may influence this item's ordering
    #[inline]
    pub fn is_rankable(&self) -> bool {
        self.is_published() && !self.category.is_privacy_sensitive()
    }
}

/// Result of recomputing an item's cached counters from source rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileReport {
    pub item_id: ItemId,
    pub before: EngagementCounters,
    pub after: EngagementCounters,
}

impl ReconcileReport {
    /// True if any cached counter disagreed with the source rows
    pub fn drifted(&self) -> bool {
        self.before != self.after
    }
}

//! Reaction entity and the single-reaction-per-actor toggle state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{ActorId, ItemId};

/// Kind of support an actor expresses on an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    #[default]
    Heart,
    Applause,
    Bookmark,
    Hug,
    Inspiring,
}

impl ReactionType {
    pub const ALL: [ReactionType; 5] = [
        ReactionType::Heart,
        ReactionType::Applause,
        ReactionType::Bookmark,
        ReactionType::Hug,
        ReactionType::Inspiring,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heart => "heart",
            Self::Applause => "applause",
            Self::Bookmark => "bookmark",
            Self::Hug => "hug",
            Self::Inspiring => "inspiring",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::InvalidReactionType(s.to_string()))
    }
}

/// Reaction entity - at most one per (actor, item) regardless of type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub actor_id: ActorId,
    pub item_id: ItemId,
    pub reaction_type: ReactionType,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a reaction toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionAction {
    /// No prior reaction; a row was inserted
    Added,
    /// Same type requested again; the row was deleted
    Removed,
    /// Different type requested; the row was updated in place
    Changed,
}

impl ReactionAction {
    /// Decide the transition from the actor's current reaction
    pub fn resolve(existing: Option<ReactionType>, requested: ReactionType) -> Self {
        match existing {
            None => Self::Added,
            Some(current) if current == requested => Self::Removed,
            Some(_) => Self::Changed,
        }
    }

    /// Change applied to the item's `support_count`
    ///
    /// A type swap is not a new reaction and leaves the count untouched.
    #[inline]
    pub fn support_delta(self) -> i64 {
        match self {
            Self::Added => 1,
            Self::Removed => -1,
            Self::Changed => 0,
        }
    }

    /// The actor's reaction after this transition
    #[inline]
    pub fn actor_reaction(self, requested: ReactionType) -> Option<ReactionType> {
        match self {
            Self::Added | Self::Changed => Some(requested),
            Self::Removed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
        }
    }
}

impl fmt::Display for ReactionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to a reaction toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionRequest {
    pub actor_id: ActorId,
    pub item_id: ItemId,
    pub reaction_type: ReactionType,
    pub message: Option<String>,
}

impl ReactionRequest {
    pub fn new(actor_id: ActorId, item_id: ItemId, reaction_type: ReactionType) -> Self {
        Self {
            actor_id,
            item_id,
            reaction_type,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Result of a committed reaction toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionOutcome {
    pub action: ReactionAction,
    pub support_count: i64,
    pub actor_reaction: Option<ReactionType>,
    /// Owner of the item, used to route the "added" notification
    pub owner_id: ActorId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resolve_transitions() {
        use ReactionType::{Applause, Heart};

        assert_eq!(ReactionAction::resolve(None, Heart), ReactionAction::Added);
        assert_eq!(
            ReactionAction::resolve(Some(Heart), Heart),
            ReactionAction::Removed
        );
        assert_eq!(
            ReactionAction::resolve(Some(Heart), Applause),
            ReactionAction::Changed
        );
    }

    #[test]
    fn test_actor_reaction_after_transition() {
        let t = ReactionType::Hug;
        assert_eq!(ReactionAction::Added.actor_reaction(t), Some(t));
        assert_eq!(ReactionAction::Changed.actor_reaction(t), Some(t));
        assert_eq!(ReactionAction::Removed.actor_reaction(t), None);
    }

    #[test]
    fn test_parse_reaction_type() {
        assert_eq!(
            "inspiring".parse::<ReactionType>().unwrap(),
            ReactionType::Inspiring
        );
        let err = "thumbsup".parse::<ReactionType>().unwrap_err();
        assert_eq!(err.code(), "INVALID_REACTION_TYPE");
    }

    fn reaction_type() -> impl Strategy<Value = ReactionType> {
        prop::sample::select(ReactionType::ALL.to_vec())
    }

    proptest! {
        /// Folding any toggle sequence keeps the count equal to
        /// added minus removed, and equal to whether a reaction is held.
        #[test]
        fn prop_support_count_matches_state(seq in prop::collection::vec(reaction_type(), 0..64)) {
            let mut current: Option<ReactionType> = None;
            let mut support: i64 = 0;
            let (mut added, mut removed) = (0i64, 0i64);

            for requested in seq {
                let action = ReactionAction::resolve(current, requested);
                match action {
                    ReactionAction::Added => added += 1,
                    ReactionAction::Removed => removed += 1,
                    ReactionAction::Changed => {}
                }
                support += action.support_delta();
                current = action.actor_reaction(requested);
            }

            prop_assert_eq!(support, added - removed);
            prop_assert_eq!(support, i64::from(current.is_some()));
        }
    }
}

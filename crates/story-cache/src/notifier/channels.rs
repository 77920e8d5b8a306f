//! Pub/Sub channel naming.

use story_core::value_objects::ActorId;

/// Channel prefix for user-specific events
pub const USER_CHANNEL_PREFIX: &str = "user:";

/// Where a notification is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationChannel {
    /// Every session of one user
    User(ActorId),
}

impl NotificationChannel {
    #[must_use]
    pub fn user(user_id: ActorId) -> Self {
        Self::User(user_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::User(id) => format!("{USER_CHANNEL_PREFIX}{id}"),
        }
    }

    /// Parse a channel name back, `None` for anything not produced by `name`
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let id = name.strip_prefix(USER_CHANNEL_PREFIX)?.parse().ok()?;
        Some(Self::User(id))
    }
}

impl std::fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

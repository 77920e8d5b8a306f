//! Redis Pub/Sub notifier.
//!
//! Publishes engagement notifications to the owner's user channel, where the
//! real-time delivery layer picks them up.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use story_core::error::DomainError;
use story_core::events::EngagementNotification;
use story_core::traits::{Notifier, RepoResult};

use crate::notifier::NotificationChannel;
use crate::pool::{RedisPool, RedisResult};

/// Wire envelope for a published notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    /// Event type name (e.g., "REACTION_ADDED")
    pub event_type: String,
    /// Event payload
    pub data: serde_json::Value,
    pub emitted_at: DateTime<Utc>,
}

impl NotificationEnvelope {
    pub fn new(
        notification: &EngagementNotification,
        emitted_at: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_type: notification.event_name().to_string(),
            data: serde_json::to_value(notification)?,
            emitted_at,
        })
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// `Notifier` backed by Redis Pub/Sub
#[derive(Debug, Clone)]
pub struct RedisNotifier {
    pool: RedisPool,
}

impl RedisNotifier {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish to the owner's channel, returning the number of receivers
    pub async fn publish(&self, notification: &EngagementNotification) -> RedisResult<u32> {
        let channel = NotificationChannel::user(notification.owner_id());
        let payload = NotificationEnvelope::new(notification, Utc::now())?.to_json()?;

        let mut conn = self.pool.get().await?;
        let channel_name = channel.name();
        let receivers: u32 = conn.publish(&channel_name, &payload).await?;

        tracing::debug!(
            channel = %channel_name,
            event_type = notification.event_name(),
            receivers = receivers,
            "Published notification"
        );

        Ok(receivers)
    }
}

#[async_trait]
impl Notifier for RedisNotifier {
    async fn notify(&self, notification: &EngagementNotification) -> RepoResult<()> {
        self.publish(notification)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::CacheError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_core::value_objects::{ActorId, CommentId, ItemId};

    #[test]
    fn test_envelope_wraps_notification() {
        let notification = EngagementNotification::CommentAdded {
            owner_id: ActorId::new(1),
            item_id: ItemId::new(2),
            actor_id: ActorId::new(3),
            comment_id: CommentId::new(4),
            preview: "thank you".to_string(),
        };
        let now = Utc::now();

        let envelope = NotificationEnvelope::new(&notification, now).unwrap();
        assert_eq!(envelope.event_type, "COMMENT_ADDED");
        assert_eq!(envelope.data["preview"], "thank you");
        assert_eq!(envelope.data["comment_id"], "4");
        assert_eq!(envelope.emitted_at, now);

        let json = envelope.to_json().unwrap();
        let back: NotificationEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_type, "COMMENT_ADDED");
    }

    #[test]
    fn test_notifier_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RedisNotifier>();
    }
}

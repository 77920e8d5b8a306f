//! Notification dispatcher port

use async_trait::async_trait;

use crate::events::EngagementNotification;
use crate::traits::RepoResult;

/// Sink for owner notifications
///
/// Callers treat delivery as fire-and-forget: an error here is logged and
/// never fails the engagement operation that produced the notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &EngagementNotification) -> RepoResult<()>;
}

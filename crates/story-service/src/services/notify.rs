//! Fire-and-forget owner notifications

use async_trait::async_trait;
use story_core::events::EngagementNotification;
use story_core::traits::{Notifier, RepoResult};
use tracing::{debug, warn};

/// Notifier used when no delivery backend is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, notification: &EngagementNotification) -> RepoResult<()> {
        debug!(
            event_type = notification.event_name(),
            owner_id = %notification.owner_id(),
            "No notifier configured, dropping notification"
        );
        Ok(())
    }
}

/// Hand the notification to the sink. Failures are logged, never returned:
/// the engagement that produced it has already committed.
pub(crate) async fn dispatch(notifier: &dyn Notifier, notification: EngagementNotification) {
    if let Err(e) = notifier.notify(&notification).await {
        warn!(
            error = %e,
            event_type = notification.event_name(),
            owner_id = %notification.owner_id(),
            "Failed to dispatch notification"
        );
    }
}

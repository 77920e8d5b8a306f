//! Engagement notifications handed to the dispatcher

mod notification;

pub use notification::{EngagementNotification, COMMENT_PREVIEW_CHARS};

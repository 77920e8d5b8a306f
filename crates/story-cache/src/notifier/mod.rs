//! Owner notification publishing over Redis Pub/Sub.

mod channels;
mod publisher;

pub use channels::{NotificationChannel, USER_CHANNEL_PREFIX};
pub use publisher::{NotificationEnvelope, RedisNotifier};

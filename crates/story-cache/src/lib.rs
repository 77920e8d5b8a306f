//! # story-cache
//!
//! Redis layer for the engagement engine.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Notifications**: `Notifier` implementation publishing owner events over Redis Pub/Sub
//!
//! ## Example
//!
//! ```ignore
//! use story_cache::{RedisNotifier, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let notifier = RedisNotifier::new(pool);
//!
//! // Delivered on channel `user:{owner_id}`
//! notifier.notify(&notification).await?;
//! ```

pub mod notifier;
pub mod pool;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export notifier types
pub use notifier::{NotificationChannel, NotificationEnvelope, RedisNotifier, USER_CHANNEL_PREFIX};

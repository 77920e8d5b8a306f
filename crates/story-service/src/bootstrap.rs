//! Wiring a [`ServiceContext`] from configuration

use std::sync::Arc;

use story_cache::{RedisNotifier, RedisPool};
use story_common::{AppConfig, AppError};
use story_core::traits::Notifier;
use story_db::{create_pool, migrations_dir, run_migrations, DatabaseConfig};
use tracing::{info, warn};

use crate::services::{NoopNotifier, ServiceContext};

/// Connect to Postgres, apply migrations, pick the notifier, and build the context
pub async fn build_context(config: &AppConfig) -> Result<ServiceContext, AppError> {
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(format!("Failed to connect to database: {e}")))?;

    run_migrations(&pool, &migrations_dir(config.database.migrations_dir.as_deref()))
        .await
        .map_err(|e| AppError::Database(format!("Failed to run migrations: {e}")))?;

    let notifier = build_notifier(config).await?;

    Ok(ServiceContext::postgres(pool, notifier)
        .with_ranking_batch_size(config.ranking.batch_size))
}

async fn build_notifier(config: &AppConfig) -> Result<Arc<dyn Notifier>, AppError> {
    let Some(redis) = &config.redis else {
        info!("REDIS_URL not set, owner notifications will be dropped");
        return Ok(Arc::new(NoopNotifier));
    };

    let pool = RedisPool::from_config(redis)
        .map_err(|e| AppError::Cache(format!("Failed to create Redis pool: {e}")))?;

    // Notifications are best effort, so an unreachable Redis only warns
    if let Err(e) = pool.health_check().await {
        warn!(error = %e, "Redis is not reachable yet, notifications may be lost");
    }

    Ok(Arc::new(RedisNotifier::new(pool)))
}

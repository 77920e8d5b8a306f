//! Ranking worker entry point
//!
//! Run with:
//! ```bash
//! cargo run -p story-worker            # scheduler until Ctrl-C
//! cargo run -p story-worker -- --once  # one recompute pass, then exit
//! ```
//!
//! Configuration is loaded from environment variables.

use anyhow::Context;
use story_common::{try_init_tracing_with_config, AppConfig, Environment, TracingConfig};
use story_service::{build_context, RankingScheduler, RankingService, ReconcileService};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Tracing is configured before config so load errors are logged
    let env = std::env::var("APP_ENV")
        .ok()
        .and_then(|v| v.parse::<Environment>().ok())
        .unwrap_or_default();
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let once = std::env::args().skip(1).any(|arg| arg == "--once");

    if let Err(e) = run(once).await {
        error!(error = format!("{e:#}"), "Ranking worker failed");
        std::process::exit(1);
    }
}

async fn run(once: bool) -> anyhow::Result<()> {
    info!("Starting ranking worker...");

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    info!(
        env = ?config.app.env,
        recompute_every_secs = config.ranking.recompute_interval_secs,
        batch_size = config.ranking.batch_size,
        notifications = config.redis.is_some(),
        "Configuration loaded"
    );

    let ctx = build_context(&config)
        .await
        .context("Failed to build service context")?;

    if once {
        let summary = RankingService::new(&ctx).recompute_all().await?;
        info!(scored = summary.scored, skipped = summary.skipped, "Single pass done");

        if config.ranking.reconcile_interval().is_some() {
            ReconcileService::new(&ctx).reconcile_all().await?;
        }
        return Ok(());
    }

    let handle = RankingScheduler::new(ctx, &config.ranking).spawn();

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    handle.shutdown().await;
    Ok(())
}

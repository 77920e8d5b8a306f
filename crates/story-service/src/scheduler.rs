//! Periodic batch ranking and counter reconciliation

use std::time::Duration;

use story_common::RankingConfig;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{error, info};

use crate::services::{RankingService, ReconcileService, ServiceContext};

/// Runs `recompute_all` on a fixed interval, and optionally `reconcile_all`
/// on its own interval, until told to stop.
///
/// A failed cycle is logged and the loop carries on with the next tick.
#[derive(Debug, Clone)]
pub struct RankingScheduler {
    ctx: ServiceContext,
    recompute_interval: Duration,
    reconcile_interval: Option<Duration>,
    run_on_startup: bool,
}

impl RankingScheduler {
    pub fn new(ctx: ServiceContext, config: &RankingConfig) -> Self {
        Self {
            ctx,
            recompute_interval: config.recompute_interval(),
            reconcile_interval: config.reconcile_interval(),
            run_on_startup: config.recompute_on_startup,
        }
    }

    /// Start the loop on the current runtime
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown, rx) = broadcast::channel(1);
        let task = tokio::spawn(self.run(rx));
        SchedulerHandle { shutdown, task }
    }

    /// Run until a shutdown message arrives or the sender is dropped
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let first_recompute = if self.run_on_startup {
            Instant::now()
        } else {
            Instant::now() + self.recompute_interval
        };
        let mut recompute = skipping_interval(first_recompute, self.recompute_interval);
        let mut reconcile = self
            .reconcile_interval
            .map(|period| skipping_interval(Instant::now() + period, period));

        info!(
            recompute_every_secs = self.recompute_interval.as_secs(),
            reconcile_every_secs = self.reconcile_interval.map(|d| d.as_secs()),
            "Ranking scheduler started"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = recompute.tick() => self.recompute_cycle().await,
                () = tick_optional(reconcile.as_mut()) => self.reconcile_cycle().await,
            }
        }

        info!("Ranking scheduler stopped");
    }

    async fn recompute_cycle(&self) {
        if let Err(e) = RankingService::new(&self.ctx).recompute_all().await {
            error!(error = %e, "Rank recompute cycle failed");
        }
    }

    async fn reconcile_cycle(&self) {
        if let Err(e) = ReconcileService::new(&self.ctx).reconcile_all().await {
            error!(error = %e, "Counter reconciliation cycle failed");
        }
    }
}

fn skipping_interval(start: Instant, period: Duration) -> Interval {
    let mut interval = interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Never resolves for a disabled interval
async fn tick_optional(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Handle to a spawned [`RankingScheduler`]
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the loop and wait for the in-flight cycle to finish
    pub async fn shutdown(self) {
        // the receiver is gone if the loop already ended
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            error!(error = %e, "Ranking scheduler task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NoopNotifier;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::sync::Arc;
    use story_core::{ActorId, Category, Item, ItemId};
    use story_db::MemoryStore;

    #[tokio::test]
    async fn test_startup_recompute_then_shutdown() {
        let store = Arc::new(MemoryStore::new());
        store.insert_item(Item::published(
            ItemId::new(1),
            ActorId::new(10),
            Category::Achievement,
            Utc::now() - ChronoDuration::hours(3),
        ));
        let ctx = ServiceContext::in_memory(store.clone(), Arc::new(NoopNotifier));
        let config = RankingConfig {
            recompute_interval_secs: 3600,
            recompute_on_startup: true,
            ..RankingConfig::default()
        };

        let handle = RankingScheduler::new(ctx, &config).spawn();

        let mut ranked = false;
        for _ in 0..50 {
            if store.item(ItemId::new(1)).and_then(|i| i.last_ranked_at).is_some() {
                ranked = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.shutdown().await;

        assert!(ranked, "startup recompute did not run");
        assert!(store.item(ItemId::new(1)).unwrap().rank_score > 0.0);
    }

    #[tokio::test]
    async fn test_no_startup_recompute_when_disabled() {
        let store = Arc::new(MemoryStore::new());
        store.insert_item(Item::published(
            ItemId::new(1),
            ActorId::new(10),
            Category::Regret,
            Utc::now(),
        ));
        let ctx = ServiceContext::in_memory(store.clone(), Arc::new(NoopNotifier));
        let config = RankingConfig {
            recompute_interval_secs: 3600,
            recompute_on_startup: false,
            ..RankingConfig::default()
        };

        let handle = RankingScheduler::new(ctx, &config).spawn();
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.shutdown().await;

        assert!(store.item(ItemId::new(1)).unwrap().last_ranked_at.is_none());
    }
}

//! Counter reconciliation service
//!
//! Cached item counters are only ever mutated by the engagement paths. This
//! service is the repair tool for drift introduced anywhere else: it
//! recomputes every derivable counter from the source rows.

use serde::Serialize;
use story_core::{DomainError, ItemId, ReconcileReport};
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Outcome of a full reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct ReconcileSummary {
    pub checked: u64,
    /// Items whose cached counters disagreed with their rows
    pub repaired: u64,
}

/// Reconcile service
pub struct ReconcileService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReconcileService<'a> {
    /// Create a new ReconcileService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Recompute one item's counters
    #[instrument(skip(self))]
    pub async fn reconcile_item(&self, item_id: ItemId) -> ServiceResult<ReconcileReport> {
        let report = self.ctx.item_repo().reconcile_counters(item_id).await?;

        if report.drifted() {
            warn!(
                item_id = %item_id,
                before = ?report.before,
                after = ?report.after,
                "Counter drift repaired"
            );
        }

        Ok(report)
    }

    /// Recompute counters for every item, one transaction per item
    #[instrument(skip(self))]
    pub async fn reconcile_all(&self) -> ServiceResult<ReconcileSummary> {
        let repo = self.ctx.item_repo();
        let batch_size = i64::from(self.ctx.ranking_batch_size());
        let mut summary = ReconcileSummary::default();
        let mut cursor = None;

        loop {
            let ids = repo.item_ids_after(cursor, batch_size).await?;
            let Some(&last) = ids.last() else { break };
            cursor = Some(last);

            for id in ids.iter().copied() {
                match self.reconcile_item(id).await {
                    Ok(report) => {
                        summary.checked += 1;
                        if report.drifted() {
                            summary.repaired += 1;
                        }
                    }
                    // deleted since the id page was read
                    Err(ServiceError::Domain(DomainError::ItemNotFound(_))) => {}
                    Err(e) => return Err(e),
                }
            }

            if (ids.len() as i64) < batch_size {
                break;
            }
        }

        info!(
            checked = summary.checked,
            repaired = summary.repaired,
            "Counter reconciliation finished"
        );

        Ok(summary)
    }
}

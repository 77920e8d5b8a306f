//! Ranking service
//!
//! Produces ordered feeds and runs the batch recompute that keeps the
//! persisted `rank_score` column fresh.
//!
//! Gravity feeds can be served two ways. On demand, the formula is
//! evaluated over every candidate at query time. Cached, the store sorts on
//! the `rank_score` written by [`RankingService::recompute_all`]. Both go
//! through [`score_item`], so they agree whenever the cache is fresh.
//! Items that have never been scored are scored before a cached page is
//! read, so a new item does not sit at the bottom until the next pass.
//!
//! The privacy-sensitive category never uses either: its feed is a fresh
//! shuffle on every request and its items are never scored.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use story_core::ranking::{
    rank_by_gravity, score_item, shuffle, FeedQuery, ItemFilter, ItemOrder, RankingPath,
};
use story_core::traits::MAX_BATCH_SIZE;
use story_core::{Item, ItemId};
use tracing::{debug, info, instrument};

use crate::dto::{FeedItemResponse, FeedResponse, PaginationMeta};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Outcome of one batch recompute pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecomputeSummary {
    /// Items whose score was written
    pub scored: u64,
    /// Private-category items, or items unpublished mid-pass
    pub skipped: u64,
    pub ranked_at: DateTime<Utc>,
}

/// Ranking service
pub struct RankingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RankingService<'a> {
    /// Create a new RankingService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// One page of a feed
    pub async fn ranked_feed(&self, query: FeedQuery) -> ServiceResult<FeedResponse> {
        self.ranked_feed_at(query, Utc::now()).await
    }

    /// [`ranked_feed`](Self::ranked_feed) with an explicit clock for on-demand scoring
    #[instrument(skip(self, now))]
    pub async fn ranked_feed_at(
        &self,
        query: FeedQuery,
        now: DateTime<Utc>,
    ) -> ServiceResult<FeedResponse> {
        let query = query.normalized();
        let algorithm = query.algorithm();

        let (total, items) = match (ItemOrder::for_algorithm(algorithm), query.path) {
            (None, _) => self.random_page(&query).await?,
            (Some(ItemOrder::RankScore), RankingPath::OnDemand) => {
                self.on_demand_page(&query, now).await?
            }
            (Some(order), _) => self.stored_page(&query, order, now).await?,
        };

        Ok(FeedResponse {
            items,
            pagination: PaginationMeta::new(total, query.page, query.per_page),
            ranking_algorithm: algorithm,
        })
    }

    async fn random_page(&self, query: &FeedQuery) -> ServiceResult<(i64, Vec<FeedItemResponse>)> {
        let mut candidates = self.ctx.item_repo().find_published(query.filter()).await?;
        shuffle(&mut candidates);

        let total = candidates.len() as i64;
        let items = page_of(&candidates, query)
            .iter()
            .map(|item| FeedItemResponse::new(item, None))
            .collect();
        Ok((total, items))
    }

    async fn on_demand_page(
        &self,
        query: &FeedQuery,
        now: DateTime<Utc>,
    ) -> ServiceResult<(i64, Vec<FeedItemResponse>)> {
        let candidates = self.ctx.item_repo().find_published(query.filter()).await?;
        let ranked = rank_by_gravity(&candidates, now);
        let by_id: HashMap<ItemId, &Item> = candidates.iter().map(|i| (i.id, i)).collect();

        let total = ranked.len() as i64;
        let items = page_of(&ranked, query)
            .iter()
            .filter_map(|r| {
                by_id
                    .get(&r.item_id)
                    .map(|item| FeedItemResponse::new(item, Some(r.score)))
            })
            .collect();
        Ok((total, items))
    }

    async fn stored_page(
        &self,
        query: &FeedQuery,
        order: ItemOrder,
        now: DateTime<Utc>,
    ) -> ServiceResult<(i64, Vec<FeedItemResponse>)> {
        let repo = self.ctx.item_repo();
        let filter = query.filter();
        if order == ItemOrder::RankScore {
            self.score_unranked(filter, now).await?;
        }
        let total = repo.count_published(filter).await?;
        let page = repo
            .page_published(filter, order, query.offset(), i64::from(query.per_page))
            .await?;

        let items = page
            .iter()
            .map(|item| {
                let score = (order == ItemOrder::RankScore).then_some(item.rank_score);
                FeedItemResponse::new(item, score)
            })
            .collect();
        Ok((total, items))
    }

    /// Score published items that no recompute pass has reached yet
    async fn score_unranked(&self, filter: ItemFilter, now: DateTime<Utc>) -> ServiceResult<()> {
        let repo = self.ctx.item_repo();
        let unranked = repo
            .unranked_published(filter, i64::from(MAX_BATCH_SIZE))
            .await?;
        if unranked.is_empty() {
            return Ok(());
        }

        let mut scored = 0u64;
        for item in unranked.iter().filter(|item| item.is_rankable()) {
            if repo
                .update_rank_score(item.id, score_item(item, now), now)
                .await?
            {
                scored += 1;
            }
        }
        debug!(scored, "Scored unranked items before cached page");
        Ok(())
    }

    /// Score every rankable published item and persist the result
    pub async fn recompute_all(&self) -> ServiceResult<RecomputeSummary> {
        self.recompute_all_at(Utc::now()).await
    }

    /// [`recompute_all`](Self::recompute_all) with an explicit clock.
    ///
    /// Each item is one single-row update, so concurrent toggles may leave a
    /// score momentarily stale but never partially written.
    #[instrument(skip(self))]
    pub async fn recompute_all_at(&self, now: DateTime<Utc>) -> ServiceResult<RecomputeSummary> {
        let repo = self.ctx.item_repo();
        let batch_size = i64::from(self.ctx.ranking_batch_size());
        let mut summary = RecomputeSummary {
            scored: 0,
            skipped: 0,
            ranked_at: now,
        };
        let mut cursor = None;

        loop {
            let batch = repo.published_batch(cursor, batch_size).await?;
            let Some(last) = batch.last() else { break };
            cursor = Some(last.id);

            for item in &batch {
                if !item.is_rankable() {
                    summary.skipped += 1;
                    continue;
                }
                if repo
                    .update_rank_score(item.id, score_item(item, now), now)
                    .await?
                {
                    summary.scored += 1;
                } else {
                    summary.skipped += 1;
                }
            }

            if (batch.len() as i64) < batch_size {
                break;
            }
        }

        info!(
            scored = summary.scored,
            skipped = summary.skipped,
            "Rank scores recomputed"
        );

        Ok(summary)
    }
}

/// The slice of `items` covered by the query's page
fn page_of<'t, T>(items: &'t [T], query: &FeedQuery) -> &'t [T] {
    let start = usize::try_from(query.offset())
        .unwrap_or(usize::MAX)
        .min(items.len());
    let end = start.saturating_add(query.per_page as usize).min(items.len());
    &items[start..end]
}

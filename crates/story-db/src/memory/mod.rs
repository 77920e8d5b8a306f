//! In-process counter store
//!
//! Implements every repository trait over plain maps behind one
//! `parking_lot::Mutex`. Each operation holds the lock for its whole
//! read-decide-write unit, which gives the same per-(actor, item)
//! linearisation as the Postgres transactions. Used by the service tests
//! and for running the engine without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use tracing::instrument;

use story_core::entities::{
    completion_rate, Bookmark, BookmarkOutcome, Comment, CommentOutcome, EngagementCounters, Item,
    NewComment, Reaction, ReactionAction, ReactionOutcome, ReactionRequest, ReadOutcome,
    ReadProgress, ReadSignal, ReconcileReport,
};
use story_core::error::{DomainError, EngagementKind};
use story_core::ranking::{ItemFilter, ItemOrder};
use story_core::traits::{
    BookmarkRepository, CommentRepository, ItemRepository, ReactionRepository,
    ReadProgressRepository, RepoResult, MAX_BATCH_SIZE,
};
use story_core::value_objects::{ActorId, CommentId, ItemId};

type PairKey = (ActorId, ItemId);

#[derive(Debug, Default)]
struct MemoryState {
    items: BTreeMap<ItemId, Item>,
    reactions: HashMap<PairKey, Reaction>,
    bookmarks: HashMap<PairKey, Bookmark>,
    read_progress: HashMap<PairKey, ReadProgress>,
    comments: BTreeMap<CommentId, Comment>,
    next_comment_id: i64,
    /// Inserts still to lose against a simulated concurrent writer
    pending_races: u32,
}

impl MemoryState {
    fn published_item_mut(&mut self, item_id: ItemId) -> RepoResult<&mut Item> {
        self.items
            .get_mut(&item_id)
            .filter(|item| item.is_published())
            .ok_or(DomainError::ItemNotFound(item_id))
    }

    /// Consume one armed race, if any
    fn take_race(&mut self) -> bool {
        if self.pending_races > 0 {
            self.pending_races -= 1;
            true
        } else {
            false
        }
    }
}

fn batch_len(limit: i64) -> usize {
    usize::try_from(limit.clamp(1, i64::from(MAX_BATCH_SIZE))).unwrap_or(1)
}

fn floor_add(value: &mut i64, delta: i64) -> i64 {
    *value = (*value + delta).max(0);
    *value
}

/// In-memory implementation of all counter store repositories
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item (items are authored outside the engine)
    pub fn insert_item(&self, item: Item) {
        self.state.lock().items.insert(item.id, item);
    }

    /// Snapshot of an item
    pub fn item(&self, id: ItemId) -> Option<Item> {
        self.state.lock().items.get(&id).cloned()
    }

    /// Number of reaction rows on an item
    pub fn reaction_rows(&self, item_id: ItemId) -> usize {
        self.state
            .lock()
            .reactions
            .keys()
            .filter(|(_, i)| *i == item_id)
            .count()
    }

    /// Scroll depths of every progress row on an item
    pub fn scroll_depths(&self, item_id: ItemId) -> Vec<f64> {
        self.state
            .lock()
            .read_progress
            .values()
            .filter(|p| p.item_id == item_id)
            .map(|p| p.scroll_depth)
            .collect()
    }

    /// Overwrite cached counters directly, bypassing the toggle paths.
    /// Only useful to simulate drift before reconciliation.
    pub fn overwrite_counters(&self, item_id: ItemId, counters: EngagementCounters) {
        if let Some(item) = self.state.lock().items.get_mut(&item_id) {
            item.counters = counters;
        }
    }

    /// Make the next `n` first-time inserts lose a race: a concurrent
    /// identical request commits its row and counter first, then the
    /// caller gets `EngagementConflict`.
    pub fn arm_insert_races(&self, n: u32) {
        self.state.lock().pending_races = n;
    }
}

// ============================================================================
// Items
// ============================================================================

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn find_by_id(&self, id: ItemId) -> RepoResult<Option<Item>> {
        Ok(self.item(id))
    }

    async fn find_published(&self, filter: ItemFilter) -> RepoResult<Vec<Item>> {
        let state = self.state.lock();
        Ok(state
            .items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    async fn page_published(
        &self,
        filter: ItemFilter,
        order: ItemOrder,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Item>> {
        let mut items = self.find_published(filter).await?;
        items.sort_by(|a, b| order.compare(a, b));
        Ok(items
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn count_published(&self, filter: ItemFilter) -> RepoResult<i64> {
        let state = self.state.lock();
        Ok(state.items.values().filter(|item| filter.matches(item)).count() as i64)
    }

    async fn published_batch(&self, after: Option<ItemId>, limit: i64) -> RepoResult<Vec<Item>> {
        let state = self.state.lock();
        Ok(state
            .items
            .values()
            .filter(|item| item.is_published() && after.is_none_or(|a| item.id > a))
            .take(batch_len(limit))
            .cloned()
            .collect())
    }

    async fn unranked_published(&self, filter: ItemFilter, limit: i64) -> RepoResult<Vec<Item>> {
        let state = self.state.lock();
        Ok(state
            .items
            .values()
            .filter(|item| filter.matches(item) && item.last_ranked_at.is_none())
            .take(batch_len(limit))
            .cloned()
            .collect())
    }

    async fn update_rank_score(
        &self,
        id: ItemId,
        score: f64,
        ranked_at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let mut state = self.state.lock();
        match state.items.get_mut(&id).filter(|item| item.is_published()) {
            Some(item) => {
                item.rank_score = score;
                item.last_ranked_at = Some(ranked_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn item_ids_after(&self, after: Option<ItemId>, limit: i64) -> RepoResult<Vec<ItemId>> {
        let state = self.state.lock();
        Ok(state
            .items
            .keys()
            .filter(|id| after.is_none_or(|a| **id > a))
            .take(batch_len(limit))
            .copied()
            .collect())
    }

    #[instrument(skip(self))]
    async fn reconcile_counters(&self, id: ItemId) -> RepoResult<ReconcileReport> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let support_count = state.reactions.keys().filter(|(_, i)| *i == id).count() as i64;
        let save_count = state.bookmarks.keys().filter(|(_, i)| *i == id).count() as i64;
        let comment_count = state.comments.values().filter(|c| c.item_id == id).count() as i64;
        let reads: Vec<&ReadProgress> = state
            .read_progress
            .values()
            .filter(|p| p.item_id == id)
            .collect();
        let unique_readers = reads.len() as i64;
        let reread_count = reads.iter().map(|p| p.read_count - 1).sum();
        let rate = completion_rate(reads.iter().map(|p| p.scroll_depth));

        let item = state
            .items
            .get_mut(&id)
            .ok_or(DomainError::ItemNotFound(id))?;
        let before = item.counters;
        item.counters = EngagementCounters {
            view_count: before.view_count,
            save_count,
            support_count,
            comment_count,
            unique_readers,
            reread_count,
            completion_rate: rate,
        };

        Ok(ReconcileReport {
            item_id: id,
            before,
            after: item.counters,
        })
    }
}

// ============================================================================
// Reactions
// ============================================================================

#[async_trait]
impl ReactionRepository for MemoryStore {
    async fn find(&self, actor_id: ActorId, item_id: ItemId) -> RepoResult<Option<Reaction>> {
        Ok(self.state.lock().reactions.get(&(actor_id, item_id)).cloned())
    }

    #[instrument(skip(self, request), fields(actor_id = %request.actor_id, item_id = %request.item_id))]
    async fn toggle(&self, request: &ReactionRequest) -> RepoResult<ReactionOutcome> {
        let key = (request.actor_id, request.item_id);
        let now = Utc::now();
        let mut state = self.state.lock();

        let owner_id = state.published_item_mut(request.item_id)?.owner_id;
        let existing = state.reactions.get(&key).map(|r| r.reaction_type);
        let action = ReactionAction::resolve(existing, request.reaction_type);

        match action {
            ReactionAction::Added => {
                let row = Reaction {
                    actor_id: request.actor_id,
                    item_id: request.item_id,
                    reaction_type: request.reaction_type,
                    message: request.message.clone(),
                    created_at: now,
                    updated_at: now,
                };
                if state.take_race() {
                    state.reactions.insert(key, row);
                    let item = state.published_item_mut(request.item_id)?;
                    floor_add(&mut item.counters.support_count, 1);
                    return Err(DomainError::EngagementConflict {
                        actor_id: request.actor_id,
                        item_id: request.item_id,
                        kind: EngagementKind::Reaction,
                    });
                }
                state.reactions.insert(key, row);
            }
            ReactionAction::Removed => {
                state.reactions.remove(&key);
            }
            ReactionAction::Changed => {
                if let Some(row) = state.reactions.get_mut(&key) {
                    row.reaction_type = request.reaction_type;
                    row.message.clone_from(&request.message);
                    row.updated_at = now;
                }
            }
        }

        let item = state.published_item_mut(request.item_id)?;
        let support_count = floor_add(&mut item.counters.support_count, action.support_delta());

        Ok(ReactionOutcome {
            action,
            support_count,
            actor_reaction: action.actor_reaction(request.reaction_type),
            owner_id,
        })
    }
}

// ============================================================================
// Bookmarks
// ============================================================================

#[async_trait]
impl BookmarkRepository for MemoryStore {
    async fn status(&self, actor_id: ActorId, item_id: ItemId) -> RepoResult<BookmarkOutcome> {
        let mut state = self.state.lock();
        let save_count = state.published_item_mut(item_id)?.counters.save_count;
        Ok(BookmarkOutcome {
            is_bookmarked: state.bookmarks.contains_key(&(actor_id, item_id)),
            save_count,
        })
    }

    #[instrument(skip(self))]
    async fn toggle(&self, actor_id: ActorId, item_id: ItemId) -> RepoResult<BookmarkOutcome> {
        let key = (actor_id, item_id);
        let mut state = self.state.lock();

        state.published_item_mut(item_id)?;
        let exists = state.bookmarks.contains_key(&key);

        let delta = if exists {
            state.bookmarks.remove(&key);
            -1
        } else {
            let row = Bookmark {
                actor_id,
                item_id,
                created_at: Utc::now(),
            };
            if state.take_race() {
                state.bookmarks.insert(key, row);
                floor_add(&mut state.published_item_mut(item_id)?.counters.save_count, 1);
                return Err(DomainError::EngagementConflict {
                    actor_id,
                    item_id,
                    kind: EngagementKind::Bookmark,
                });
            }
            state.bookmarks.insert(key, row);
            1
        };

        let save_count = floor_add(&mut state.published_item_mut(item_id)?.counters.save_count, delta);

        Ok(BookmarkOutcome {
            is_bookmarked: !exists,
            save_count,
        })
    }

    async fn find_by_actor(
        &self,
        actor_id: ActorId,
        offset: i64,
        limit: i64,
    ) -> RepoResult<Vec<Bookmark>> {
        let state = self.state.lock();
        let mut rows: Vec<Bookmark> = state
            .bookmarks
            .values()
            .filter(|b| b.actor_id == actor_id)
            .filter(|b| state.items.get(&b.item_id).is_some_and(Item::is_published))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.item_id.cmp(&a.item_id))
        });
        Ok(rows
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit.clamp(1, 100)).unwrap_or(1))
            .collect())
    }

    async fn count_by_actor(&self, actor_id: ActorId) -> RepoResult<i64> {
        let state = self.state.lock();
        Ok(state
            .bookmarks
            .values()
            .filter(|b| b.actor_id == actor_id)
            .filter(|b| state.items.get(&b.item_id).is_some_and(Item::is_published))
            .count() as i64)
    }
}

// ============================================================================
// Read progress
// ============================================================================

#[async_trait]
impl ReadProgressRepository for MemoryStore {
    async fn find(&self, actor_id: ActorId, item_id: ItemId) -> RepoResult<Option<ReadProgress>> {
        Ok(self
            .state
            .lock()
            .read_progress
            .get(&(actor_id, item_id))
            .cloned())
    }

    #[instrument(skip(self, now), fields(item_id = %signal.item_id()))]
    async fn record(&self, signal: &ReadSignal, now: DateTime<Utc>) -> RepoResult<ReadOutcome> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let (actor_id, item_id, sample) = match *signal {
            ReadSignal::AnonymousView { item_id } => {
                let item = state.published_item_mut(item_id)?;
                item.counters.view_count += 1;
                let c = item.counters;
                return Ok(ReadOutcome {
                    view_count: c.view_count,
                    unique_readers: c.unique_readers,
                    reread_count: c.reread_count,
                    completion_rate: c.completion_rate,
                    progress: None,
                    is_new_reader: false,
                });
            }
            ReadSignal::AuthenticatedRead {
                actor_id,
                item_id,
                sample,
            } => (actor_id, item_id, sample),
        };

        state.published_item_mut(item_id)?;
        let key = (actor_id, item_id);

        let (progress, is_new_reader) = match state.read_progress.get_mut(&key) {
            Some(progress) => {
                progress.absorb(sample, now);
                (progress.clone(), false)
            }
            None => {
                let progress = ReadProgress::first(actor_id, item_id, sample, now);
                if state.take_race() {
                    // the concurrent first read commits as a whole
                    state.read_progress.insert(key, progress);
                    apply_read(state, item_id, true)?;
                    return Err(DomainError::EngagementConflict {
                        actor_id,
                        item_id,
                        kind: EngagementKind::ReadProgress,
                    });
                }
                state.read_progress.insert(key, progress.clone());
                (progress, true)
            }
        };

        let c = apply_read(state, item_id, is_new_reader)?;

        Ok(ReadOutcome {
            view_count: c.view_count,
            unique_readers: c.unique_readers,
            reread_count: c.reread_count,
            completion_rate: c.completion_rate,
            progress: Some(progress),
            is_new_reader,
        })
    }
}

/// Counter side of an authenticated read, after the progress row is written
fn apply_read(
    state: &mut MemoryState,
    item_id: ItemId,
    is_new_reader: bool,
) -> RepoResult<EngagementCounters> {
    let rate = completion_rate(
        state
            .read_progress
            .values()
            .filter(|p| p.item_id == item_id)
            .map(|p| p.scroll_depth),
    );

    let item = state.published_item_mut(item_id)?;
    item.counters.view_count += 1;
    if is_new_reader {
        item.counters.unique_readers += 1;
    } else {
        item.counters.reread_count += 1;
    }
    item.counters.completion_rate = rate;
    Ok(item.counters)
}

// ============================================================================
// Comments
// ============================================================================

#[async_trait]
impl CommentRepository for MemoryStore {
    #[instrument(skip(self, comment), fields(item_id = %comment.item_id, actor_id = %comment.actor_id))]
    async fn create(&self, comment: &NewComment) -> RepoResult<CommentOutcome> {
        let mut state = self.state.lock();

        let owner_id = state.published_item_mut(comment.item_id)?.owner_id;

        if let Some(parent_id) = comment.parent_id {
            let parent_ok = state
                .comments
                .get(&parent_id)
                .is_some_and(|p| p.item_id == comment.item_id);
            if !parent_ok {
                return Err(DomainError::CommentNotFound(parent_id));
            }
        }

        state.next_comment_id += 1;
        let row = Comment {
            id: CommentId::new(state.next_comment_id),
            item_id: comment.item_id,
            actor_id: comment.actor_id,
            parent_id: comment.parent_id,
            content: comment.content.clone(),
            created_at: Utc::now(),
        };
        state.comments.insert(row.id, row.clone());

        let comment_count = floor_add(
            &mut state.published_item_mut(comment.item_id)?.counters.comment_count,
            1,
        );

        Ok(CommentOutcome {
            comment: row,
            comment_count,
            owner_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_core::entities::{Category, ItemStatus, ReactionType, ReadSample};
    use std::sync::Arc;

    fn store_with_item(id: i64) -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_item(Item::published(
            ItemId::new(id),
            ActorId::new(100),
            Category::Achievement,
            Utc::now(),
        ));
        store
    }

    #[tokio::test]
    async fn test_unpublished_item_is_not_found() {
        let store = store_with_item(1);
        let mut draft = store.item(ItemId::new(1)).unwrap();
        draft.status = ItemStatus::Draft;
        store.insert_item(draft);

        let err = BookmarkRepository::toggle(&store, ActorId::new(1), ItemId::new(1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.item(ItemId::new(1)).unwrap().counters.save_count, 0);
    }

    #[tokio::test]
    async fn test_unranked_published_skips_scored_and_filtered_items() {
        let store = store_with_item(1);
        store.insert_item(Item::published(
            ItemId::new(2),
            ActorId::new(100),
            Category::Achievement,
            Utc::now(),
        ));
        store.insert_item(Item::published(
            ItemId::new(3),
            ActorId::new(100),
            Category::UnsentLetter,
            Utc::now(),
        ));
        assert!(store
            .update_rank_score(ItemId::new(1), 0.3, Utc::now())
            .await
            .unwrap());

        let unranked = store
            .unranked_published(ItemFilter::for_category(None), 100)
            .await
            .unwrap();
        let ids: Vec<ItemId> = unranked.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![ItemId::new(2)]);
    }

    #[tokio::test]
    async fn test_decrement_floors_at_zero() {
        let store = store_with_item(1);
        let item_id = ItemId::new(1);
        let actor = ActorId::new(5);

        BookmarkRepository::toggle(&store, actor, item_id).await.unwrap();
        // counter drifted below the row count
        store.overwrite_counters(item_id, EngagementCounters::default());

        let outcome = BookmarkRepository::toggle(&store, actor, item_id).await.unwrap();
        assert!(!outcome.is_bookmarked);
        assert_eq!(outcome.save_count, 0);
    }

    #[tokio::test]
    async fn test_armed_race_commits_winner_then_conflicts() {
        let store = store_with_item(1);
        store.arm_insert_races(1);
        let request = ReactionRequest::new(ActorId::new(1), ItemId::new(1), ReactionType::Heart);

        let err = ReactionRepository::toggle(&store, &request).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.reaction_rows(ItemId::new(1)), 1);
        assert_eq!(store.item(ItemId::new(1)).unwrap().counters.support_count, 1);
    }

    #[tokio::test]
    async fn test_concurrent_bookmark_toggles_keep_invariants() {
        let store = Arc::new(store_with_item(1));
        let mut handles = Vec::new();

        for actor in 0..8 {
            for _ in 0..5 {
                let store = Arc::clone(&store);
                handles.push(tokio::spawn(async move {
                    BookmarkRepository::toggle(&*store, ActorId::new(actor), ItemId::new(1)).await
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // five toggles each: every actor ends bookmarked
        let item = store.item(ItemId::new(1)).unwrap();
        assert_eq!(item.counters.save_count, 8);
        assert_eq!(
            BookmarkRepository::count_by_actor(&*store, ActorId::new(3)).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_anonymous_view_touches_only_views() {
        let store = store_with_item(1);
        let outcome = store
            .record(
                &ReadSignal::AnonymousView {
                    item_id: ItemId::new(1),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.view_count, 1);
        assert_eq!(outcome.unique_readers, 0);
        assert!(outcome.progress.is_none());
        assert!(store.scroll_depths(ItemId::new(1)).is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_repairs_drift() {
        let store = store_with_item(1);
        let item_id = ItemId::new(1);
        let actor = ActorId::new(9);
        let now = Utc::now();

        ReactionRepository::toggle(&store, &ReactionRequest::new(actor, item_id, ReactionType::Hug))
            .await
            .unwrap();
        for depth in [0.4, 0.8] {
            store
                .record(
                    &ReadSignal::AuthenticatedRead {
                        actor_id: actor,
                        item_id,
                        sample: ReadSample::new(Some(depth), None),
                    },
                    now,
                )
                .await
                .unwrap();
        }

        let good = store.item(item_id).unwrap().counters;
        store.overwrite_counters(
            item_id,
            EngagementCounters {
                support_count: 40,
                reread_count: 0,
                ..good
            },
        );

        let report = store.reconcile_counters(item_id).await.unwrap();
        assert!(report.drifted());
        assert_eq!(report.after, good);
        assert_eq!(report.after.reread_count, 1);
        assert_eq!(report.after.view_count, 2);
    }
}

//! Read progress - per-(actor, item) reading record and its merge rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ActorId, ItemId};

/// Scroll depth at which a read counts as completed
pub const COMPLETION_THRESHOLD: f64 = 0.9;

/// Longest single reading session accepted, in seconds (one day)
pub const MAX_TIME_SPENT_SECONDS: i64 = 86_400;

/// One observation from the client: either field may be absent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReadSample {
    pub scroll_depth: Option<f64>,
    pub time_spent_seconds: Option<i64>,
}

impl ReadSample {
    pub fn new(scroll_depth: Option<f64>, time_spent_seconds: Option<i64>) -> Self {
        Self {
            scroll_depth,
            time_spent_seconds,
        }
    }

    /// Scroll depth clamped to [0, 1]; NaN is treated as 0
    pub fn scroll(&self) -> Option<f64> {
        self.scroll_depth.map(clamp_unit)
    }

    /// Time spent, clamped to [0, MAX_TIME_SPENT_SECONDS]
    pub fn time_spent(&self) -> Option<i64> {
        self.time_spent_seconds.map(|t| t.clamp(0, MAX_TIME_SPENT_SECONDS))
    }
}

/// A read event. Anonymous views only bump `view_count`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadSignal {
    AnonymousView {
        item_id: ItemId,
    },
    AuthenticatedRead {
        actor_id: ActorId,
        item_id: ItemId,
        sample: ReadSample,
    },
}

impl ReadSignal {
    pub fn item_id(&self) -> ItemId {
        match self {
            Self::AnonymousView { item_id } | Self::AuthenticatedRead { item_id, .. } => *item_id,
        }
    }

    pub fn actor_id(&self) -> Option<ActorId> {
        match self {
            Self::AnonymousView { .. } => None,
            Self::AuthenticatedRead { actor_id, .. } => Some(*actor_id),
        }
    }
}

/// ReadProgress entity - at most one per (actor, item)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadProgress {
    pub actor_id: ActorId,
    pub item_id: ItemId,
    pub scroll_depth: f64,
    pub time_spent_seconds: i64,
    pub completed: bool,
    pub read_count: i64,
    pub first_read_at: DateTime<Utc>,
    pub last_read_at: DateTime<Utc>,
}

impl ReadProgress {
    /// Record for an actor's first read of an item
    pub fn first(actor_id: ActorId, item_id: ItemId, sample: ReadSample, now: DateTime<Utc>) -> Self {
        let scroll_depth = sample.scroll().unwrap_or(0.0);
        Self {
            actor_id,
            item_id,
            scroll_depth,
            time_spent_seconds: sample.time_spent().unwrap_or(0),
            completed: scroll_depth >= COMPLETION_THRESHOLD,
            read_count: 1,
            first_read_at: now,
            last_read_at: now,
        }
    }

    /// Merge a repeat read into this record
    ///
    /// Scroll depth keeps the maximum ever observed. Time spent becomes the
    /// integer mean of the stored and the new value. Absent fields are left
    /// unchanged, but a reported `0` is an observation: it is averaged in
    /// and halves the stored time, rather than being skipped like an
    /// absent value.
    pub fn absorb(&mut self, sample: ReadSample, now: DateTime<Utc>) {
        self.read_count = self.read_count.saturating_add(1);
        if let Some(depth) = sample.scroll() {
            self.scroll_depth = self.scroll_depth.max(depth);
        }
        if let Some(secs) = sample.time_spent() {
            self.time_spent_seconds = mean_floor(self.time_spent_seconds.max(0), secs);
        }
        self.completed = self.completed || self.scroll_depth >= COMPLETION_THRESHOLD;
        self.last_read_at = now;
    }
}

/// Floor of `(a + b) / 2` for non-negative `a` and `b`, without overflow
fn mean_floor(a: i64, b: i64) -> i64 {
    a / 2 + b / 2 + (a % 2 + b % 2) / 2
}

/// Result of recording a read
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOutcome {
    pub view_count: i64,
    pub unique_readers: i64,
    pub reread_count: i64,
    pub completion_rate: f64,
    /// The actor's merged record; `None` for anonymous views
    pub progress: Option<ReadProgress>,
    pub is_new_reader: bool,
}

/// Arithmetic mean of scroll depths, 0 when there are no reads
pub fn completion_rate<I>(depths: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, n) = depths
        .into_iter()
        .fold((0.0_f64, 0_u64), |(s, n), d| (s + d, n + 1));
    if n == 0 {
        0.0
    } else {
        clamp_unit(sum / n as f64)
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids() -> (ActorId, ItemId) {
        (ActorId::new(1), ItemId::new(10))
    }

    #[test]
    fn test_first_read_defaults() {
        let (a, i) = ids();
        let p = ReadProgress::first(a, i, ReadSample::default(), Utc::now());
        assert_eq!(p.read_count, 1);
        assert_eq!(p.scroll_depth, 0.0);
        assert_eq!(p.time_spent_seconds, 0);
        assert!(!p.completed);
    }

    #[test]
    fn test_first_read_completed() {
        let (a, i) = ids();
        let p = ReadProgress::first(a, i, ReadSample::new(Some(0.95), Some(30)), Utc::now());
        assert!(p.completed);
        assert_eq!(p.time_spent_seconds, 30);
    }

    #[test]
    fn test_absorb_merges() {
        let (a, i) = ids();
        let now = Utc::now();
        let mut p = ReadProgress::first(a, i, ReadSample::new(Some(0.5), Some(100)), now);

        p.absorb(ReadSample::new(Some(0.3), Some(51)), now);
        assert_eq!(p.read_count, 2);
        assert_eq!(p.scroll_depth, 0.5);
        assert_eq!(p.time_spent_seconds, 75);
        assert!(!p.completed);

        p.absorb(ReadSample::new(None, None), now);
        assert_eq!(p.read_count, 3);
        assert_eq!(p.scroll_depth, 0.5);
        assert_eq!(p.time_spent_seconds, 75);

        p.absorb(ReadSample::new(Some(0.9), Some(0)), now);
        assert!(p.completed);
        assert_eq!(p.time_spent_seconds, 37);
    }

    #[test]
    fn test_absorb_huge_time_spent_does_not_overflow() {
        let (a, i) = ids();
        let now = Utc::now();
        let mut p = ReadProgress::first(a, i, ReadSample::new(None, Some(i64::MAX)), now);
        assert_eq!(p.time_spent_seconds, MAX_TIME_SPENT_SECONDS);

        // a stored value from outside the clamp must not overflow either
        p.time_spent_seconds = i64::MAX;
        p.absorb(ReadSample::new(None, Some(i64::MAX)), now);
        assert_eq!(p.read_count, 2);
        assert_eq!(
            p.time_spent_seconds,
            i64::MAX / 2 + MAX_TIME_SPENT_SECONDS / 2
        );

        p.time_spent_seconds = MAX_TIME_SPENT_SECONDS;
        p.absorb(ReadSample::new(None, Some(i64::MAX)), now);
        assert_eq!(p.time_spent_seconds, MAX_TIME_SPENT_SECONDS);
    }

    #[test]
    fn test_mean_floor_matches_plain_mean() {
        for (a, b) in [(0, 0), (1, 0), (1, 1), (100, 51), (75, 0), (3, 5)] {
            assert_eq!(mean_floor(a, b), (a + b) / 2);
        }
    }

    #[test]
    fn test_sample_clamping() {
        let s = ReadSample::new(Some(1.7), Some(-5));
        assert_eq!(s.scroll(), Some(1.0));
        assert_eq!(s.time_spent(), Some(0));
        assert_eq!(
            ReadSample::new(None, Some(i64::MAX)).time_spent(),
            Some(MAX_TIME_SPENT_SECONDS)
        );
        assert_eq!(ReadSample::new(Some(f64::NAN), None).scroll(), Some(0.0));
    }

    #[test]
    fn test_completion_rate() {
        assert_eq!(completion_rate(Vec::new()), 0.0);
        assert!((completion_rate([0.5, 1.0]) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_signal_accessors() {
        let (a, i) = ids();
        let anon = ReadSignal::AnonymousView { item_id: i };
        assert_eq!(anon.item_id(), i);
        assert_eq!(anon.actor_id(), None);

        let read = ReadSignal::AuthenticatedRead {
            actor_id: a,
            item_id: i,
            sample: ReadSample::default(),
        };
        assert_eq!(read.actor_id(), Some(a));
    }

    proptest! {
        #[test]
        fn prop_scroll_depth_never_decreases(
            depths in prop::collection::vec(prop::option::of(0.0f64..=1.0), 1..32)
        ) {
            let (a, i) = ids();
            let now = Utc::now();
            let mut p = ReadProgress::first(a, i, ReadSample::new(depths[0], None), now);
            let mut seen_max = depths[0].unwrap_or(0.0);

            for d in &depths[1..] {
                let before = p.scroll_depth;
                p.absorb(ReadSample::new(*d, None), now);
                if let Some(d) = d {
                    seen_max = seen_max.max(*d);
                }
                prop_assert!(p.scroll_depth >= before);
                prop_assert!((p.scroll_depth - seen_max).abs() < f64::EPSILON);
                prop_assert_eq!(p.completed, seen_max >= COMPLETION_THRESHOLD);
            }
            prop_assert_eq!(p.read_count, depths.len() as i64);
        }

        #[test]
        fn prop_completion_rate_in_unit_range(depths in prop::collection::vec(0.0f64..=1.0, 0..64)) {
            let rate = completion_rate(depths);
            prop_assert!((0.0..=1.0).contains(&rate));
        }
    }
}

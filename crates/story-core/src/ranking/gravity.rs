//! Gravity-decay scoring
//!
//! `score = (points + 1) / (age_hours + 2) ^ GRAVITY`, with
//! `points = save_count + support_count + view_count / 10`.
//! Both the on-demand feed path and the batch recompute call [`score_item`],
//! so the two can never disagree on the formula.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::entities::{EngagementCounters, Item};
use crate::value_objects::ItemId;

/// Decay exponent. Below 1.0 ranking degenerates toward pure recency.
pub const GRAVITY: f64 = 1.8;

/// Views are weighted at one tenth of a save or a reaction
pub const VIEW_WEIGHT_DIVISOR: f64 = 10.0;

/// Keeps zero-engagement items above zero
pub const SCORE_NUMERATOR_OFFSET: f64 = 1.0;

/// Keeps just-published items from dividing by ~0
pub const AGE_OFFSET_HOURS: f64 = 2.0;

/// Engagement points for the numerator
pub fn engagement_points(counters: &EngagementCounters) -> f64 {
    counters.save_count.max(0) as f64
        + counters.support_count.max(0) as f64
        + counters.view_count.max(0) as f64 / VIEW_WEIGHT_DIVISOR
}

/// Hours since publication
///
/// A missing timestamp, or one in the future, counts as just published.
pub fn age_hours(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match published_at {
        Some(at) => {
            let millis = (now - at).num_milliseconds();
            if millis <= 0 {
                0.0
            } else {
                millis as f64 / 3_600_000.0
            }
        }
        None => 0.0,
    }
}

/// The raw formula
pub fn gravity_score(points: f64, age_hours: f64) -> f64 {
    (points + SCORE_NUMERATOR_OFFSET) / (age_hours.max(0.0) + AGE_OFFSET_HOURS).powf(GRAVITY)
}

/// Score an item at `now`
pub fn score_item(item: &Item, now: DateTime<Utc>) -> f64 {
    gravity_score(
        engagement_points(&item.counters),
        age_hours(item.published_at, now),
    )
}

/// An item's position in a ranked feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedItem {
    pub item_id: ItemId,
    pub score: f64,
    pub published_at: Option<DateTime<Utc>>,
}

impl RankedItem {
    /// Score descending, then newest first, then higher id first
    pub fn feed_order(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.published_at.cmp(&self.published_at))
            .then_with(|| other.item_id.cmp(&self.item_id))
    }
}

/// Evaluate the formula over a candidate set and sort it for display
pub fn rank_by_gravity(items: &[Item], now: DateTime<Utc>) -> Vec<RankedItem> {
    let mut ranked: Vec<RankedItem> = items
        .iter()
        .map(|item| RankedItem {
            item_id: item.id,
            score: score_item(item, now),
            published_at: item.published_at,
        })
        .collect();
    ranked.sort_by(RankedItem::feed_order);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Category;
    use crate::value_objects::ActorId;
    use chrono::Duration;
    use proptest::prelude::*;

    fn item(id: i64, published_at: Option<DateTime<Utc>>, counters: EngagementCounters) -> Item {
        Item {
            published_at,
            counters,
            ..Item::published(ItemId::new(id), ActorId::new(1), Category::Other, Utc::now())
        }
    }

    #[test]
    fn test_fresh_item_with_no_engagement() {
        let now = Utc::now();
        let it = item(1, Some(now), EngagementCounters::default());
        let score = score_item(&it, now);
        assert!((score - 1.0 / 2f64.powf(1.8)).abs() < 1e-12);
        assert!((score - 0.287).abs() < 0.001);
    }

    #[test]
    fn test_points_weighting() {
        let counters = EngagementCounters {
            view_count: 25,
            save_count: 2,
            support_count: 3,
            ..Default::default()
        };
        assert!((engagement_points(&counters) - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_missing_published_at_is_just_published() {
        let now = Utc::now();
        assert_eq!(age_hours(None, now), 0.0);
        assert_eq!(age_hours(Some(now + Duration::hours(3)), now), 0.0);
        assert!((age_hours(Some(now - Duration::minutes(90)), now) - 1.5).abs() < 1e-9);

        let it = item(1, None, EngagementCounters::default());
        assert!(score_item(&it, now) > 0.0);
    }

    #[test]
    fn test_rank_order_and_tie_break() {
        let now = Utc::now();
        let popular = EngagementCounters {
            support_count: 10,
            ..Default::default()
        };
        let items = vec![
            item(1, Some(now - Duration::hours(1)), EngagementCounters::default()),
            item(2, Some(now - Duration::hours(1)), popular),
            item(3, Some(now - Duration::hours(1)), EngagementCounters::default()),
        ];
        let ranked = rank_by_gravity(&items, now);
        assert_eq!(ranked[0].item_id, ItemId::new(2));
        // equal score and timestamp fall back to id descending
        assert_eq!(ranked[1].item_id, ItemId::new(3));
        assert_eq!(ranked[2].item_id, ItemId::new(1));
    }

    #[test]
    fn test_tie_break_on_published_at() {
        let a = RankedItem {
            item_id: ItemId::new(1),
            score: 1.0,
            published_at: Some(Utc::now()),
        };
        let b = RankedItem {
            item_id: ItemId::new(2),
            score: 1.0,
            published_at: a.published_at.map(|t| t - Duration::hours(1)),
        };
        assert_eq!(a.feed_order(&b), Ordering::Less);
    }

    proptest! {
        #[test]
        fn prop_decreasing_in_age(points in 0.0f64..1e6, age in 0.0f64..1e4, extra in 0.001f64..1e3) {
            prop_assert!(gravity_score(points, age + extra) < gravity_score(points, age));
        }

        #[test]
        fn prop_increasing_in_points(points in 0.0f64..1e6, age in 0.0f64..1e4, extra in 0.001f64..1e3) {
            prop_assert!(gravity_score(points + extra, age) > gravity_score(points, age));
        }

        #[test]
        fn prop_always_positive(points in 0.0f64..1e9, age in 0.0f64..1e6) {
            prop_assert!(gravity_score(points, age) > 0.0);
        }
    }
}

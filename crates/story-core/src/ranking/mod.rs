//! Ranking - the gravity-decay formula and feed ordering rules

mod feed;
mod gravity;

pub use feed::{
    shuffle, FeedQuery, FeedSort, ItemFilter, ItemOrder, RankingAlgorithm, RankingPath,
    DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
pub use gravity::{
    age_hours, engagement_points, gravity_score, rank_by_gravity, score_item, RankedItem,
    AGE_OFFSET_HOURS, GRAVITY, SCORE_NUMERATOR_OFFSET, VIEW_WEIGHT_DIVISOR,
};

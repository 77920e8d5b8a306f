//! Feed query model: sort modes, delivery paths, filtering and ordering

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::entities::{Category, Item};
use crate::error::DomainError;

/// Upper bound for `per_page`
pub const MAX_PER_PAGE: u32 = 100;

/// Default page size when the caller does not specify one
pub const DEFAULT_PER_PAGE: u32 = 20;

/// The ordering actually applied to a feed, reported back to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingAlgorithm {
    Random,
    Gravity,
    Latest,
    Trending,
    MostViewed,
}

impl RankingAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Gravity => "gravity",
            Self::Latest => "latest",
            Self::Trending => "trending",
            Self::MostViewed => "most_viewed",
        }
    }
}

impl fmt::Display for RankingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested sort mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedSort {
    /// Gravity decay (random for the privacy-sensitive category)
    #[default]
    Smart,
    Latest,
    Trending,
    MostViewed,
}

impl FromStr for FeedSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smart" => Ok(Self::Smart),
            "latest" => Ok(Self::Latest),
            "trending" => Ok(Self::Trending),
            "most_viewed" => Ok(Self::MostViewed),
            other => Err(DomainError::ValidationError(format!(
                "unknown sort mode: {other}"
            ))),
        }
    }
}

/// How a gravity feed is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RankingPath {
    /// Evaluate the formula over the candidates at query time
    OnDemand,
    /// Sort on the persisted `rank_score` written by the batch recompute
    #[default]
    Cached,
}

/// Parameters of a feed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedQuery {
    pub category: Option<Category>,
    pub page: u32,
    pub per_page: u32,
    pub sort: FeedSort,
    pub path: RankingPath,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            category: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            sort: FeedSort::Smart,
            path: RankingPath::Cached,
        }
    }
}

impl FeedQuery {
    pub fn new(category: Option<Category>, page: u32, per_page: u32) -> Self {
        Self {
            category,
            page,
            per_page,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sort(mut self, sort: FeedSort) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: RankingPath) -> Self {
        self.path = path;
        self
    }

    /// Page at least 1, page size within 1..=100
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Row offset of the (normalized) page
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    /// Ordering to apply; the privacy-sensitive category always shuffles
    pub fn algorithm(&self) -> RankingAlgorithm {
        if self.category.is_some_and(Category::is_privacy_sensitive) {
            return RankingAlgorithm::Random;
        }
        match self.sort {
            FeedSort::Smart => RankingAlgorithm::Gravity,
            FeedSort::Latest => RankingAlgorithm::Latest,
            FeedSort::Trending => RankingAlgorithm::Trending,
            FeedSort::MostViewed => RankingAlgorithm::MostViewed,
        }
    }

    /// Candidate filter for this feed
    pub fn filter(&self) -> ItemFilter {
        ItemFilter::for_category(self.category)
    }
}

/// Which published items a feed draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFilter {
    pub category: Option<Category>,
    /// Leave out privacy-sensitive items (set for unfiltered feeds)
    pub exclude_private: bool,
}

impl ItemFilter {
    /// An explicit category shows only that category; no category shows
    /// everything except private disclosures.
    pub fn for_category(category: Option<Category>) -> Self {
        Self {
            category,
            exclude_private: category.is_none(),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        item.is_published()
            && self.category.is_none_or(|c| c == item.category)
            && !(self.exclude_private && item.category.is_privacy_sensitive())
    }
}

/// Sort keys supported by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOrder {
    /// Persisted `rank_score` descending
    RankScore,
    /// `published_at` descending
    Latest,
    /// `support_count` descending
    Trending,
    /// `view_count` descending
    MostViewed,
}

impl ItemOrder {
    /// Store ordering for an algorithm; `None` for random
    pub fn for_algorithm(algorithm: RankingAlgorithm) -> Option<Self> {
        match algorithm {
            RankingAlgorithm::Random => None,
            RankingAlgorithm::Gravity => Some(Self::RankScore),
            RankingAlgorithm::Latest => Some(Self::Latest),
            RankingAlgorithm::Trending => Some(Self::Trending),
            RankingAlgorithm::MostViewed => Some(Self::MostViewed),
        }
    }

    /// In-memory comparison matching the SQL `ORDER BY` for this key.
    /// Ties fall back to `published_at` descending (nulls last), then id descending.
    pub fn compare(self, a: &Item, b: &Item) -> Ordering {
        let primary = match self {
            Self::RankScore => b.rank_score.total_cmp(&a.rank_score),
            Self::Latest => Ordering::Equal,
            Self::Trending => b.counters.support_count.cmp(&a.counters.support_count),
            Self::MostViewed => b.counters.view_count.cmp(&a.counters.view_count),
        };
        primary
            .then_with(|| b.published_at.cmp(&a.published_at))
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// Fresh random permutation, different on every call
pub fn shuffle<T>(items: &mut [T]) {
    items.shuffle(&mut rand::thread_rng());
}

//! Item entity <-> model mapper

use story_core::entities::{EngagementCounters, Item};
use story_core::error::DomainError;
use story_core::value_objects::{ActorId, ItemId};

use crate::models::{CountersModel, ItemModel};

impl From<CountersModel> for EngagementCounters {
    fn from(model: CountersModel) -> Self {
        EngagementCounters {
            view_count: model.view_count,
            save_count: model.save_count,
            support_count: model.support_count,
            comment_count: model.comment_count,
            unique_readers: model.unique_readers,
            reread_count: model.reread_count,
            completion_rate: model.completion_rate,
        }
    }
}

/// Convert ItemModel to Item entity; fails on an unknown category or status
impl TryFrom<ItemModel> for Item {
    type Error = DomainError;

    fn try_from(model: ItemModel) -> Result<Self, Self::Error> {
        Ok(Item {
            id: ItemId::new(model.id),
            owner_id: ActorId::new(model.owner_id),
            category: model.category.parse()?,
            status: model.status.parse()?,
            published_at: model.published_at,
            counters: EngagementCounters {
                view_count: model.view_count,
                save_count: model.save_count,
                support_count: model.support_count,
                comment_count: model.comment_count,
                unique_readers: model.unique_readers,
                reread_count: model.reread_count,
                completion_rate: model.completion_rate,
            },
            rank_score: model.rank_score,
            last_ranked_at: model.last_ranked_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_core::entities::{Category, ItemStatus};

    fn model(category: &str) -> ItemModel {
        ItemModel {
            id: 7,
            owner_id: 3,
            category: category.to_string(),
            status: "published".to_string(),
            published_at: None,
            view_count: 10,
            save_count: 1,
            support_count: 2,
            comment_count: 0,
            unique_readers: 4,
            reread_count: 1,
            completion_rate: 0.5,
            rank_score: 0.0,
            last_ranked_at: None,
        }
    }

    #[test]
    fn test_item_from_model() {
        let item = Item::try_from(model("unsent_letter")).unwrap();
        assert_eq!(item.id, ItemId::new(7));
        assert_eq!(item.category, Category::UnsentLetter);
        assert_eq!(item.status, ItemStatus::Published);
        assert_eq!(item.counters.view_count, 10);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert!(Item::try_from(model("poetry")).is_err());
    }
}

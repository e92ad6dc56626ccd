//! Catalog record types shared by the ESI client, the caches and the sync
//! orchestrators.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::entity::item_name::{ActiveModel as ItemNameActiveModel, Model as ItemNameModel};
use crate::entity::market_group::{
    ActiveModel as MarketGroupActiveModel, Model as MarketGroupModel,
};

/// The catalogs mirrored by this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    MarketGroups,
    ItemNames,
}

impl CatalogKind {
    /// Stable key used for sync markers and log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogKind::MarketGroups => "market_groups",
            CatalogKind::ItemNames => "item_names",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A market group definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketGroup {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub parent_id: Option<i64>,
    /// Item type ids in upstream order.
    pub member_ids: Vec<i64>,
}

impl MarketGroup {
    /// Convert to a SeaORM active model stamped with the current time.
    pub fn to_active_model(&self) -> MarketGroupActiveModel {
        MarketGroupActiveModel {
            id: Set(self.id),
            name: Set(self.name.clone()),
            description: Set(self.description.clone()),
            parent_id: Set(self.parent_id),
            member_ids: Set(serde_json::json!(self.member_ids)),
            cached_at: Set(Utc::now().fixed_offset()),
        }
    }

    /// Rebuild a group from its stored row.
    ///
    /// Fails only if the stored member list is not a JSON array of integers.
    pub fn from_model(model: MarketGroupModel) -> Result<Self, serde_json::Error> {
        let member_ids: Vec<i64> = serde_json::from_value(model.member_ids)?;
        Ok(Self {
            id: model.id,
            name: model.name,
            description: model.description,
            parent_id: model.parent_id,
            member_ids,
        })
    }
}

/// A resolved name for an ESI id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemName {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
}

impl ItemName {
    pub fn to_active_model(&self) -> ItemNameActiveModel {
        ItemNameActiveModel {
            id: Set(self.id),
            name: Set(self.name.clone()),
            category: Set(self.category.clone()),
            cached_at: Set(Utc::now().fixed_offset()),
        }
    }

    /// Split into the map key and value used by [`ItemNames`].
    #[must_use]
    pub fn into_entry(self) -> (i64, NameEntry) {
        (
            self.id,
            NameEntry {
                name: self.name,
                category: self.category,
            },
        )
    }
}

impl From<ItemNameModel> for ItemName {
    fn from(model: ItemNameModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category: model.category,
        }
    }
}

/// Name and category for one id in an [`ItemNames`] map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEntry {
    pub name: String,
    pub category: Option<String>,
}

/// Resolved id → name mapping, ordered by id.
pub type ItemNames = BTreeMap<i64, NameEntry>;

/// Flatten the member ids of `groups` into one list, keeping the first
/// occurrence of each id.
#[must_use]
pub fn member_universe(groups: &[MarketGroup]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    groups
        .iter()
        .flat_map(|group| group.member_ids.iter().copied())
        .filter(|id| seen.insert(*id))
        .collect()
}

//! ESI wire payloads.
//!
//! Only the fields the catalog needs are declared; anything else in the
//! response is ignored.

use serde::Deserialize;

use crate::catalog::{ItemName, MarketGroup};

/// `GET /markets/groups/{id}/` response body.
///
/// API docs: https://esi.evetech.net/ui/#/Market/get_markets_groups_market_group_id
#[derive(Debug, Clone, Deserialize)]
pub struct EsiMarketGroup {
    pub market_group_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_group_id: Option<i64>,
    /// Item type ids belonging to the group.
    pub types: Vec<i64>,
}

impl From<EsiMarketGroup> for MarketGroup {
    fn from(group: EsiMarketGroup) -> Self {
        Self {
            id: group.market_group_id,
            name: group.name,
            description: group.description,
            parent_id: group.parent_group_id,
            member_ids: group.types,
        }
    }
}

/// One entry of a `POST /universe/names/` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct EsiName {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl From<EsiName> for ItemName {
    fn from(entry: EsiName) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            category: entry.category,
        }
    }
}

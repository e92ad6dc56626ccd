//! MarketGroup entity - one cached ESI market group definition.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// MarketGroup model - a market group row mirrored from ESI.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "market_groups")]
pub struct Model {
    /// ESI market group id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Free-form description, may be empty.
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Parent market group, absent for top-level groups.
    pub parent_id: Option<i64>,

    /// Item type ids belonging to this group (JSON array, order preserved).
    #[sea_orm(column_type = "Json")]
    pub member_ids: serde_json::Value,

    /// When this row was last written.
    pub cached_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

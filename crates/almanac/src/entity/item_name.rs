//! ItemName entity - resolved display names for ESI ids.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_names")]
pub struct Model {
    /// ESI entity id (item type ids for the market catalog).
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    pub name: String,

    /// ESI name category (e.g. "inventory_type"), when reported.
    pub category: Option<String>,

    /// When this row was last written.
    pub cached_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

//! Common re-exports for convenient entity usage.

pub use super::item_name::{
    ActiveModel as ItemNameActiveModel, Column as ItemNameColumn, Entity as ItemNameEntity,
    Model as ItemNameModel,
};
pub use super::market_group::{
    ActiveModel as MarketGroupActiveModel, Column as MarketGroupColumn,
    Entity as MarketGroupEntity, Model as MarketGroupModel,
};
pub use super::sync_marker::{
    ActiveModel as SyncMarkerActiveModel, Column as SyncMarkerColumn, Entity as SyncMarkerEntity,
    Model as SyncMarkerModel,
};

//! SyncMarker entity - durable "catalog fully synced" flags.
//!
//! A row's presence is the whole signal. There is deliberately no timestamp or
//! version column; markers are only ever inserted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_markers")]
pub struct Model {
    /// Catalog key, see [`crate::catalog::CatalogKind::as_str`].
    #[sea_orm(primary_key, auto_increment = false)]
    pub catalog: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use super::error::{CacheError, Result};
use super::{CatalogCache, MAX_BIND_PARAMS, dedupe_last_wins, unique_keys};
use crate::catalog::MarketGroup;
use crate::entity::market_group::{Column, Entity as MarketGroupEntity, Model};

const TABLE: &str = "market_groups";

/// Columns written per row.
const COLUMNS: usize = 6;

/// Market group definitions, keyed by group id.
#[derive(Clone, Debug)]
pub struct GroupCache {
    db: Arc<DatabaseConnection>,
}

impl GroupCache {
    pub fn new(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self { db: db.into() }
    }

    fn decode(model: Model) -> Result<MarketGroup> {
        let id = model.id;
        MarketGroup::from_model(model).map_err(|e| CacheError::Corrupt {
            table: TABLE,
            id,
            message: e.to_string(),
        })
    }
}

/// Conflict on the group id overwrites every other column.
pub(crate) fn build_upsert_on_conflict() -> OnConflict {
    OnConflict::column(Column::Id)
        .update_columns([
            Column::Name,
            Column::Description,
            Column::ParentId,
            Column::MemberIds,
            Column::CachedAt,
        ])
        .to_owned()
}

#[async_trait]
impl CatalogCache for GroupCache {
    type Key = i64;
    type Record = MarketGroup;

    async fn bulk_get(&self, keys: &[i64]) -> Result<Vec<Option<MarketGroup>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut found: HashMap<i64, MarketGroup> = HashMap::with_capacity(keys.len());
        for chunk in unique_keys(keys).chunks(MAX_BIND_PARAMS) {
            let models = MarketGroupEntity::find()
                .filter(Column::Id.is_in(chunk.to_vec()))
                .all(&*self.db)
                .await?;
            for model in models {
                let group = Self::decode(model)?;
                found.insert(group.id, group);
            }
        }

        Ok(keys.iter().map(|id| found.get(id).cloned()).collect())
    }

    async fn bulk_upsert(&self, records: Vec<MarketGroup>) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let records = dedupe_last_wins(records, |g| g.id);
        let count = records.len() as u64;
        tracing::debug!(count, table = TABLE, "Upserting rows");

        for chunk in records.chunks(MAX_BIND_PARAMS / COLUMNS) {
            MarketGroupEntity::insert_many(chunk.iter().map(MarketGroup::to_active_model))
                .on_conflict(build_upsert_on_conflict())
                .exec_without_returning(&*self.db)
                .await?;
        }

        Ok(count)
    }

    async fn all(&self) -> Result<Vec<MarketGroup>> {
        MarketGroupEntity::find()
            .order_by_asc(Column::Id)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    async fn count(&self) -> Result<u64> {
        Ok(MarketGroupEntity::find().count(&*self.db).await?)
    }
}

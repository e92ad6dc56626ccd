use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use super::error::Result;
use super::{CatalogCache, MAX_BIND_PARAMS, dedupe_last_wins, unique_keys};
use crate::catalog::ItemName;
use crate::entity::item_name::{Column, Entity as ItemNameEntity};

const TABLE: &str = "item_names";

/// Columns written per row.
const COLUMNS: usize = 4;

/// Resolved names, keyed by ESI id.
#[derive(Clone, Debug)]
pub struct NameCache {
    db: Arc<DatabaseConnection>,
}

impl NameCache {
    pub fn new(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self { db: db.into() }
    }
}

pub(crate) fn build_upsert_on_conflict() -> OnConflict {
    OnConflict::column(Column::Id)
        .update_columns([Column::Name, Column::Category, Column::CachedAt])
        .to_owned()
}

#[async_trait]
impl CatalogCache for NameCache {
    type Key = i64;
    type Record = ItemName;

    async fn bulk_get(&self, keys: &[i64]) -> Result<Vec<Option<ItemName>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut found: HashMap<i64, ItemName> = HashMap::with_capacity(keys.len());
        for chunk in unique_keys(keys).chunks(MAX_BIND_PARAMS) {
            let models = ItemNameEntity::find()
                .filter(Column::Id.is_in(chunk.to_vec()))
                .all(&*self.db)
                .await?;
            found.extend(models.into_iter().map(|m| (m.id, ItemName::from(m))));
        }

        Ok(keys.iter().map(|id| found.get(id).cloned()).collect())
    }

    async fn bulk_upsert(&self, records: Vec<ItemName>) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let records = dedupe_last_wins(records, |n| n.id);
        let count = records.len() as u64;
        tracing::debug!(count, table = TABLE, "Upserting rows");

        for chunk in records.chunks(MAX_BIND_PARAMS / COLUMNS) {
            ItemNameEntity::insert_many(chunk.iter().map(ItemName::to_active_model))
                .on_conflict(build_upsert_on_conflict())
                .exec_without_returning(&*self.db)
                .await?;
        }

        Ok(count)
    }

    async fn all(&self) -> Result<Vec<ItemName>> {
        Ok(ItemNameEntity::find()
            .order_by_asc(Column::Id)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(ItemName::from)
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(ItemNameEntity::find().count(&*self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::entity::item_name::Model;

    fn name(id: i64, value: &str) -> ItemName {
        ItemName {
            id,
            name: value.to_string(),
            category: Some("inventory_type".to_string()),
        }
    }

    #[tokio::test]
    async fn get_returns_single_row() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![Model {
                id: 34,
                name: "Tritanium".to_string(),
                category: None,
                cached_at: Utc::now().fixed_offset(),
            }]])
            .append_query_results([Vec::<Model>::new()])
            .into_connection();
        let cache = NameCache::new(db);

        let hit = cache.get(34).await.unwrap();
        assert_eq!(hit.map(|n| n.name), Some("Tritanium".to_string()));
        assert!(cache.get(35).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bulk_upsert_chunks_large_batches() {
        let per_chunk = MAX_BIND_PARAMS / COLUMNS;
        let total = per_chunk * 2 + 1;
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results((0..3).map(|_| MockExecResult {
                rows_affected: 1,
                last_insert_id: 0,
            }))
            .into_connection();
        let db = Arc::new(db);
        let cache = NameCache::new(Arc::clone(&db));

        let records: Vec<ItemName> = (0..total as i64).map(|id| name(id, "x")).collect();
        assert_eq!(cache.bulk_upsert(records).await.unwrap(), total as u64);

        drop(cache);
        let db = Arc::into_inner(db).expect("cache released the connection");
        assert_eq!(db.into_transaction_log().len(), 3);
    }

    #[test]
    fn on_conflict_overwrites_name_and_category() {
        use sea_orm::QueryTrait;

        let sql = ItemNameEntity::insert(name(1, "a").to_active_model())
            .on_conflict(build_upsert_on_conflict())
            .build(DatabaseBackend::Sqlite)
            .to_string();
        assert!(sql.contains("ON CONFLICT (\"id\") DO UPDATE"));
        assert!(sql.contains("\"category\" = \"excluded\".\"category\""));
    }
}

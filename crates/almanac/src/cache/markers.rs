use std::sync::Arc;

use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use super::error::Result;
use crate::catalog::CatalogKind;
use crate::entity::sync_marker::{ActiveModel, Column, Entity as SyncMarkerEntity};

/// Durable "catalog fully synced" flags.
///
/// Markers are only ever added; nothing in the library clears them.
#[derive(Clone, Debug)]
pub struct SyncMarkers {
    db: Arc<DatabaseConnection>,
}

impl SyncMarkers {
    pub fn new(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self { db: db.into() }
    }

    pub async fn is_set(&self, kind: CatalogKind) -> Result<bool> {
        Ok(SyncMarkerEntity::find_by_id(kind.as_str().to_string())
            .one(&*self.db)
            .await?
            .is_some())
    }

    /// Record that `kind` is fully synced. Setting an existing marker is a no-op.
    pub async fn set(&self, kind: CatalogKind) -> Result<()> {
        let marker = ActiveModel {
            catalog: Set(kind.as_str().to_string()),
        };
        SyncMarkerEntity::insert(marker)
            .on_conflict(OnConflict::column(Column::Catalog).do_nothing().to_owned())
            .exec_without_returning(&*self.db)
            .await?;
        tracing::debug!(catalog = %kind, "Sync marker set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::entity::sync_marker::Model;

    #[tokio::test]
    async fn is_set_reflects_row_presence() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![Model {
                catalog: "market_groups".to_string(),
            }]])
            .append_query_results([Vec::<Model>::new()])
            .into_connection();
        let markers = SyncMarkers::new(db);

        assert!(markers.is_set(CatalogKind::MarketGroups).await.unwrap());
        assert!(!markers.is_set(CatalogKind::ItemNames).await.unwrap());
    }

    #[tokio::test]
    async fn set_tolerates_existing_marker() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([
                MockExecResult {
                    rows_affected: 1,
                    last_insert_id: 0,
                },
                MockExecResult {
                    rows_affected: 0,
                    last_insert_id: 0,
                },
            ])
            .into_connection();
        let markers = SyncMarkers::new(db);

        markers.set(CatalogKind::MarketGroups).await.unwrap();
        markers.set(CatalogKind::MarketGroups).await.unwrap();
    }
}

//! Initial migration creating the catalog tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_market_groups(manager).await?;
        self.create_item_names(manager).await?;
        self.create_sync_markers(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncMarkers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ItemNames::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MarketGroups::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_market_groups(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MarketGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MarketGroups::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MarketGroups::Name).string().not_null())
                    .col(
                        ColumnDef::new(MarketGroups::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(MarketGroups::ParentId).big_integer().null())
                    .col(
                        ColumnDef::new(MarketGroups::MemberIds)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(MarketGroups::CachedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_market_groups_parent_id")
                    .table(MarketGroups::Table)
                    .col(MarketGroups::ParentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_item_names(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ItemNames::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemNames::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ItemNames::Name).string().not_null())
                    .col(ColumnDef::new(ItemNames::Category).string().null())
                    .col(
                        ColumnDef::new(ItemNames::CachedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_sync_markers(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncMarkers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncMarkers::Catalog)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "market_groups")]
enum MarketGroups {
    Table,
    Id,
    Name,
    Description,
    ParentId,
    MemberIds,
    CachedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "item_names")]
enum ItemNames {
    Table,
    Id,
    Name,
    Category,
    CachedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "sync_markers")]
enum SyncMarkers {
    Table,
    Catalog,
}

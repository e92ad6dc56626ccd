//! Integration tests for the catalog caches against a real SQLite schema.
//!
//! These tests require the `sqlite` and `migrate` features to be enabled
//! (both are on by default).

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use std::sync::Arc;

use almanac::cache::{CacheError, CatalogCache, GroupCache, NameCache, SyncMarkers};
use almanac::catalog::{CatalogKind, ItemName, MarketGroup};
use almanac::connect_and_migrate;
use almanac::entity::market_group::{ActiveModel as MarketGroupActiveModel, Entity as MarketGroupEntity};
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};

async fn setup_test_db() -> Arc<DatabaseConnection> {
    let db = connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    Arc::new(db)
}

fn group(id: i64, members: Vec<i64>) -> MarketGroup {
    MarketGroup {
        id,
        name: format!("Group {id}"),
        description: format!("Description of group {id}"),
        parent_id: (id > 1).then_some(1),
        member_ids: members,
    }
}

fn name(id: i64, value: &str) -> ItemName {
    ItemName {
        id,
        name: value.to_string(),
        category: Some("inventory_type".to_string()),
    }
}

#[tokio::test]
async fn test_group_round_trip_preserves_member_order() {
    let db = setup_test_db().await;
    let cache = GroupCache::new(db);

    let original = group(61, vec![587, 585, 586, 585]);
    cache.bulk_upsert(vec![original.clone()]).await.unwrap();

    let stored = cache.get(61).await.unwrap().expect("group should be cached");
    assert_eq!(stored, original);
}

#[tokio::test]
async fn test_bulk_get_matches_input_shape() {
    let db = setup_test_db().await;
    let cache = NameCache::new(db);
    cache
        .bulk_upsert(vec![name(34, "Tritanium"), name(36, "Mexallon")])
        .await
        .unwrap();

    let got = cache.bulk_get(&[36, 35, 34, 36]).await.unwrap();
    let names: Vec<Option<String>> = got.into_iter().map(|n| n.map(|n| n.name)).collect();
    assert_eq!(
        names,
        vec![
            Some("Mexallon".to_string()),
            None,
            Some("Tritanium".to_string()),
            Some("Mexallon".to_string())
        ]
    );
}

#[tokio::test]
async fn test_bulk_upsert_overwrites_existing_keys() {
    let db = setup_test_db().await;
    let cache = NameCache::new(db);

    cache.bulk_upsert(vec![name(34, "Old")]).await.unwrap();
    cache
        .bulk_upsert(vec![name(34, "Tritanium"), name(35, "Pyerite")])
        .await
        .unwrap();

    assert_eq!(cache.count().await.unwrap(), 2);
    assert_eq!(cache.get(34).await.unwrap().unwrap().name, "Tritanium");
}

#[tokio::test]
async fn test_bulk_upsert_duplicate_keys_in_one_batch() {
    let db = setup_test_db().await;
    let cache = GroupCache::new(db);

    let written = cache
        .bulk_upsert(vec![group(2, vec![1]), group(2, vec![2, 3])])
        .await
        .unwrap();

    assert_eq!(written, 1);
    assert_eq!(cache.get(2).await.unwrap().unwrap().member_ids, vec![2, 3]);
}

#[tokio::test]
async fn test_bulk_upsert_larger_than_one_statement() {
    let db = setup_test_db().await;
    let cache = NameCache::new(db);

    let records: Vec<ItemName> = (1..=2_500).map(|id| name(id, &format!("item {id}"))).collect();
    assert_eq!(cache.bulk_upsert(records).await.unwrap(), 2_500);
    assert_eq!(cache.count().await.unwrap(), 2_500);

    let ids: Vec<i64> = (1..=2_500).collect();
    let got = cache.bulk_get(&ids).await.unwrap();
    assert!(got.iter().all(Option::is_some));
}

#[tokio::test]
async fn test_bulk_upsert_empty_is_noop() {
    let db = setup_test_db().await;
    let cache = GroupCache::new(db);
    assert_eq!(cache.bulk_upsert(Vec::new()).await.unwrap(), 0);
    assert_eq!(cache.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_all_is_ordered_by_key() {
    let db = setup_test_db().await;
    let cache = GroupCache::new(db);
    cache
        .bulk_upsert(vec![group(30, vec![]), group(4, vec![]), group(17, vec![])])
        .await
        .unwrap();

    let ids: Vec<i64> = cache.all().await.unwrap().into_iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![4, 17, 30]);
}

#[tokio::test]
async fn test_corrupt_member_list_surfaces_as_error() {
    let db = setup_test_db().await;
    MarketGroupEntity::insert(MarketGroupActiveModel {
        id: Set(9),
        name: Set("Broken".to_string()),
        description: Set(String::new()),
        parent_id: Set(None),
        member_ids: Set(serde_json::json!({"types": [1]})),
        cached_at: Set(Utc::now().fixed_offset()),
    })
    .exec_without_returning(&*db)
    .await
    .unwrap();

    let cache = GroupCache::new(db);
    let err = cache.get(9).await.unwrap_err();
    assert!(matches!(err, CacheError::Corrupt { id: 9, .. }));
}

#[tokio::test]
async fn test_sync_markers_are_idempotent() {
    let db = setup_test_db().await;
    let markers = SyncMarkers::new(db.clone());

    assert!(!markers.is_set(CatalogKind::MarketGroups).await.unwrap());
    markers.set(CatalogKind::MarketGroups).await.unwrap();
    markers.set(CatalogKind::MarketGroups).await.unwrap();
    assert!(markers.is_set(CatalogKind::MarketGroups).await.unwrap());
    assert!(!markers.is_set(CatalogKind::ItemNames).await.unwrap());

    let rows = almanac::entity::sync_marker::Entity::find()
        .count(&*db)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_caches_share_one_connection() {
    let db = setup_test_db().await;
    let writer = GroupCache::new(Arc::clone(&db));
    let reader = writer.clone();
    let names = NameCache::new(Arc::clone(&db));

    writer.bulk_upsert(vec![group(5, vec![34])]).await.unwrap();
    names.bulk_upsert(vec![name(34, "Tritanium")]).await.unwrap();

    assert_eq!(reader.get(5).await.unwrap().map(|g| g.member_ids), Some(vec![34]));
    assert_eq!(NameCache::new(db).count().await.unwrap(), 1);
}

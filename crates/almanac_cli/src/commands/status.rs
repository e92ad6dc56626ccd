use std::sync::Arc;

use almanac::cache::{CatalogCache, GroupCache, NameCache, SyncMarkers};
use almanac::catalog::CatalogKind;
use serde::Serialize;

/// Local cache state for one catalog.
#[derive(Debug, Serialize)]
struct CatalogStatus {
    catalog: CatalogKind,
    records: u64,
    /// Sentinel state; only the group catalog records one.
    fully_synced: Option<bool>,
}

pub(crate) async fn handle_status(
    json: bool,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Arc::new(almanac::connect_and_migrate(database_url).await?);
    let markers = SyncMarkers::new(Arc::clone(&db));

    let statuses = vec![
        CatalogStatus {
            catalog: CatalogKind::MarketGroups,
            records: GroupCache::new(Arc::clone(&db)).count().await?,
            fully_synced: Some(markers.is_set(CatalogKind::MarketGroups).await?),
        },
        CatalogStatus {
            catalog: CatalogKind::ItemNames,
            records: NameCache::new(db).count().await?,
            fully_synced: None,
        },
    ];

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    println!("Database: {database_url}");
    for status in &statuses {
        println!("{}", format_status(status));
    }
    Ok(())
}

fn format_status(status: &CatalogStatus) -> String {
    let state = match status.fully_synced {
        Some(true) => "fully synced",
        Some(false) => "not fully synced",
        None => "-",
    };
    format!(
        "{:<14} {:>8} record(s)  {state}",
        status.catalog.as_str(),
        status.records
    )
}

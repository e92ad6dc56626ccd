//! Almanac - a durable local mirror of the EVE ESI market catalog.
//!
//! Market group definitions and item names are static reference data behind a
//! rate-limited API. This library caches them in a local database, fetches
//! only what is missing, and spreads the fetches over bounded concurrent
//! rounds gated by ESI's shared error budget.
//!
//! # Features
//!
//! - `sqlite` (default) / `postgres` - database backends.
//! - `migrate` (default) - Enables database migration support. When enabled,
//!   you can use [`connect_and_migrate`] to run migrations on connection.
//!
//! # Example
//!
//! ```ignore
//! use almanac::esi::{ESI_BASE_URL, EsiClient};
//! use almanac::sync::CatalogSync;
//!
//! let db = almanac::connect_and_migrate("sqlite://almanac.db?mode=rwc").await?;
//! let client = EsiClient::new(ESI_BASE_URL, "my-industry-tool", None)?;
//! let sync = CatalogSync::new(client, db);
//!
//! let groups = sync.resolve_market_groups().await?;
//! let names = sync.resolve_item_names().await?;
//! ```

pub mod batch;
pub mod cache;
pub mod catalog;
pub mod db;
pub mod entity;
pub mod esi;
pub mod http;
pub mod source;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

pub use batch::run_in_rounds;
pub use cache::{CacheError, CatalogCache, GroupCache, NameCache, SyncMarkers};
pub use catalog::{CatalogKind, ItemName, ItemNames, MarketGroup, NameEntry};
pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use esi::{ApiRateLimiter, BudgetSnapshot, ErrorBudget, EsiClient, EsiError};
pub use source::CatalogSource;
pub use sync::{AggregateFetchError, CatalogSync, SyncError, SyncOptions, SyncReport};

//! Catalog sync orchestration.
//!
//! # Module Structure
//!
//! - [`types`] - Core types: `SyncOptions`, `SyncPhase`, `SyncReport`, constants
//! - [`error`] - `SyncError`, `AggregateFetchError`, `PageFailure`
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - `merge` - Cache partitioning and paged fetching shared by both catalogs
//! - [`orchestrator`] - `CatalogSync` and its resolve entry points
//!
//! # Example
//!
//! ```ignore
//! use almanac::esi::{ESI_BASE_URL, EsiClient};
//! use almanac::sync::{CatalogSync, SyncError, SyncOptions};
//!
//! let sync = CatalogSync::new(client, db).with_options(SyncOptions::default());
//! match sync.resolve_item_names().await {
//!     Ok(names) => println!("{} names", names.len()),
//!     Err(SyncError::Incomplete(err)) => {
//!         let partial = err.partial_names().map(|n| n.len()).unwrap_or(0);
//!         eprintln!("{err}; {partial} names usable");
//!     }
//!     Err(err) => return Err(err.into()),
//! }
//! ```

mod error;
mod merge;
mod orchestrator;
mod progress;
mod types;

// Re-export types
pub use types::{SyncOptions, SyncPhase, SyncReport};

// Re-export constants
pub use types::{DEFAULT_GROUP_CONCURRENCY, DEFAULT_NAME_CONCURRENCY, DEFAULT_NAME_PAGE_SIZE};

// Re-export errors
pub use error::{AggregateFetchError, PageFailure, PartialCatalog, SyncError};

// Re-export progress types
pub use progress::{ProgressCallback, SyncProgress, emit};

pub use orchestrator::CatalogSync;

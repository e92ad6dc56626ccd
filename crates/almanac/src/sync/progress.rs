//! Progress reporting types for catalog syncs.

use crate::catalog::CatalogKind;

use super::types::SyncReport;

/// Progress events emitted during a resolve call.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// The local cache was consulted.
    CacheChecked {
        catalog: CatalogKind,
        /// Records already cached.
        cached: usize,
        /// Ids that must be fetched.
        missing: usize,
    },

    /// Starting to fetch the missing ids.
    FetchingPages {
        catalog: CatalogKind,
        /// Number of upstream pages.
        pages: usize,
        /// Pages fetched concurrently per round.
        concurrency: usize,
    },

    /// A page was fetched and validated.
    PageFetched {
        catalog: CatalogKind,
        /// Page number (1-indexed).
        page: usize,
        /// Records on this page.
        records: usize,
    },

    /// A page failed. Sibling pages continue.
    PageFailed {
        catalog: CatalogKind,
        /// Page number (1-indexed).
        page: usize,
        /// Ids the page asked for.
        keys: usize,
        /// Error message.
        error: String,
    },

    /// Fetched records were written to the cache.
    Persisted { catalog: CatalogKind, count: u64 },

    /// The catalog's sync marker was recorded.
    MarkerSet { catalog: CatalogKind },

    /// The call finished, with or without failures.
    Finished { report: SyncReport },
}

/// Callback for progress updates during sync operations.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
///
/// # Example
///
/// ```ignore
/// use almanac::sync::{emit, ProgressCallback, SyncProgress};
/// use almanac::catalog::CatalogKind;
///
/// fn report(on_progress: Option<&ProgressCallback>) {
///     emit(on_progress, SyncProgress::MarkerSet { catalog: CatalogKind::MarketGroups });
/// }
/// ```
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

//! Progress reporting for sync operations.
//!
//! Sync progress events are forwarded to `tracing` as structured log lines.

use almanac::sync::{ProgressCallback, SyncProgress};

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::CacheChecked {
                catalog,
                cached,
                missing,
            } => {
                tracing::info!(catalog = %catalog, cached, missing, "Checked local cache");
            }

            SyncProgress::FetchingPages {
                catalog,
                pages,
                concurrency,
            } => {
                tracing::info!(catalog = %catalog, pages, concurrency, "Fetching from ESI");
            }

            SyncProgress::PageFetched {
                catalog,
                page,
                records,
            } => {
                tracing::debug!(catalog = %catalog, page, records, "Fetched page");
            }

            SyncProgress::PageFailed {
                catalog,
                page,
                keys,
                error,
            } => {
                tracing::warn!(catalog = %catalog, page, keys, error = %error, "Page failed");
            }

            SyncProgress::Persisted { catalog, count } => {
                tracing::info!(catalog = %catalog, count, "Saved to database");
            }

            SyncProgress::MarkerSet { catalog } => {
                tracing::debug!(catalog = %catalog, "Marked catalog as fully synced");
            }

            SyncProgress::Finished { report } => {
                if !report.is_complete() {
                    tracing::warn!(
                        catalog = %report.catalog,
                        cache_hits = report.cache_hits,
                        fetched = report.fetched,
                        failed_pages = report.failed_pages,
                        upstream_calls = report.upstream_calls,
                        "Sync finished with errors"
                    );
                } else {
                    tracing::info!(
                        catalog = %report.catalog,
                        cache_hits = report.cache_hits,
                        fetched = report.fetched,
                        upstream_calls = report.upstream_calls,
                        "Sync finished"
                    );
                }
            }

            other => {
                tracing::debug!(event = ?other, "Sync progress");
            }
        }
    }

    /// Wrap this reporter in a callback for [`almanac::sync::CatalogSync`].
    pub fn into_callback(self) -> ProgressCallback {
        Box::new(move |event| self.handle(event))
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}

//! Shared sync types and constants.

use std::fmt;

use serde::Serialize;

use crate::catalog::CatalogKind;
use crate::esi::NAMES_PAGE_LIMIT;

/// Default number of market groups fetched concurrently per round.
pub const DEFAULT_GROUP_CONCURRENCY: usize = 10;

/// Default number of name pages fetched concurrently per round.
pub const DEFAULT_NAME_CONCURRENCY: usize = 10;

/// Default ids per name lookup.
pub const DEFAULT_NAME_PAGE_SIZE: usize = NAMES_PAGE_LIMIT;

/// Options for catalog syncs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Round width for market group fetches.
    pub group_concurrency: usize,
    /// Round width for name lookups.
    pub name_concurrency: usize,
    /// Ids per name lookup, clamped to `1..=NAMES_PAGE_LIMIT`.
    pub name_page_size: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            group_concurrency: DEFAULT_GROUP_CONCURRENCY,
            name_concurrency: DEFAULT_NAME_CONCURRENCY,
            name_page_size: DEFAULT_NAME_PAGE_SIZE,
        }
    }
}

impl SyncOptions {
    /// The page size actually used for name lookups.
    #[must_use]
    pub fn effective_name_page_size(&self) -> usize {
        self.name_page_size.clamp(1, NAMES_PAGE_LIMIT)
    }
}

/// Where a single resolve call is in its lifecycle.
///
/// `CacheCheck` moves straight to `Done` on a full cache hit; otherwise the
/// call passes through `Fetching` and `Merging` and ends in `Done` or
/// `DoneWithError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    NotStarted,
    CacheCheck,
    Fetching,
    Merging,
    Done,
    DoneWithError,
}

impl SyncPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SyncPhase::Done | SyncPhase::DoneWithError)
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncPhase::NotStarted => "not started",
            SyncPhase::CacheCheck => "cache check",
            SyncPhase::Fetching => "fetching",
            SyncPhase::Merging => "merging",
            SyncPhase::Done => "done",
            SyncPhase::DoneWithError => "done with errors",
        };
        f.write_str(s)
    }
}

/// Summary of one resolve call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub catalog: CatalogKind,
    /// Records served from the local cache.
    pub cache_hits: usize,
    /// Records fetched upstream and persisted.
    pub fetched: usize,
    /// Pages that failed, including any carried over from a dependent catalog.
    pub failed_pages: usize,
    /// Upstream requests issued for this catalog.
    pub upstream_calls: usize,
    /// Phase the call ended in.
    pub phase: SyncPhase,
}

impl SyncReport {
    pub fn new(catalog: CatalogKind) -> Self {
        Self {
            catalog,
            cache_hits: 0,
            fetched: 0,
            failed_pages: 0,
            upstream_calls: 0,
            phase: SyncPhase::NotStarted,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == SyncPhase::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = SyncOptions::default();
        assert_eq!(options.group_concurrency, 10);
        assert_eq!(options.name_concurrency, 10);
        assert_eq!(options.name_page_size, 1000);
    }

    #[test]
    fn name_page_size_is_clamped_to_protocol_limit() {
        let mut options = SyncOptions {
            name_page_size: 5000,
            ..SyncOptions::default()
        };
        assert_eq!(options.effective_name_page_size(), NAMES_PAGE_LIMIT);
        options.name_page_size = 0;
        assert_eq!(options.effective_name_page_size(), 1);
        options.name_page_size = 250;
        assert_eq!(options.effective_name_page_size(), 250);
    }

    #[test]
    fn terminal_phases() {
        assert!(SyncPhase::Done.is_terminal());
        assert!(SyncPhase::DoneWithError.is_terminal());
        assert!(!SyncPhase::Merging.is_terminal());
        assert_eq!(SyncPhase::DoneWithError.to_string(), "done with errors");
    }

    #[test]
    fn report_starts_empty() {
        let report = SyncReport::new(CatalogKind::ItemNames);
        assert_eq!(report.phase, SyncPhase::NotStarted);
        assert!(!report.is_complete());
        assert_eq!(report.upstream_calls, 0);
    }
}

//! The fetch-and-merge steps shared by every catalog.
//!
//! Both resolve calls follow the same shape: split the requested ids into
//! cache hits and gaps, fan the gaps out in pages through
//! [`run_in_rounds`], then reduce the settled pages into successes and
//! failures.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use super::error::PageFailure;
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::SyncPhase;
use crate::batch::run_in_rounds;
use crate::catalog::CatalogKind;
use crate::esi::{EsiError, short_error_message};

/// Tracks and traces the phase of one resolve call.
#[derive(Debug)]
pub(crate) struct PhaseTracker {
    catalog: CatalogKind,
    phase: SyncPhase,
}

impl PhaseTracker {
    pub(crate) fn new(catalog: CatalogKind) -> Self {
        Self {
            catalog,
            phase: SyncPhase::NotStarted,
        }
    }

    pub(crate) fn advance(&mut self, next: SyncPhase) {
        debug_assert!(
            !self.phase.is_terminal(),
            "{} sync advanced past terminal phase {}",
            self.catalog,
            self.phase
        );
        tracing::debug!(
            catalog = %self.catalog,
            from = %self.phase,
            to = %next,
            "Sync phase transition"
        );
        self.phase = next;
    }

    pub(crate) fn phase(&self) -> SyncPhase {
        self.phase
    }
}

/// Cache lookup split into hits and the ids still to fetch.
#[derive(Debug)]
pub(crate) struct Partition<R> {
    pub(crate) hits: HashMap<i64, R>,
    /// Unique missing ids, in first-requested order.
    pub(crate) missing: Vec<i64>,
}

/// Pair `keys` with their `bulk_get` results.
pub(crate) fn partition<R>(keys: &[i64], cached: Vec<Option<R>>) -> Partition<R> {
    let mut hits = HashMap::new();
    let mut missing = Vec::new();
    let mut seen = HashSet::with_capacity(keys.len());

    for (key, record) in keys.iter().copied().zip(cached) {
        if !seen.insert(key) {
            continue;
        }
        match record {
            Some(record) => {
                hits.insert(key, record);
            }
            None => missing.push(key),
        }
    }

    Partition { hits, missing }
}

/// Settled outcome of every page.
#[derive(Debug)]
pub(crate) struct FetchOutcome<R> {
    pub(crate) pages: usize,
    pub(crate) fetched: Vec<R>,
    pub(crate) failures: Vec<PageFailure>,
}

/// Fetch `missing` in pages of `page_size`, `width` pages per round.
///
/// Every page settles before this returns. A failed page is recorded and
/// never cancels its siblings.
pub(crate) async fn fetch_pages<R, F, Fut>(
    catalog: CatalogKind,
    missing: Vec<i64>,
    page_size: usize,
    width: usize,
    fetch: F,
    on_progress: Option<&ProgressCallback>,
) -> FetchOutcome<R>
where
    F: Fn(Vec<i64>) -> Fut,
    Fut: Future<Output = Result<Vec<R>, EsiError>>,
{
    let pages: Vec<(usize, Vec<i64>)> = missing
        .chunks(page_size.max(1))
        .map(<[i64]>::to_vec)
        .enumerate()
        .map(|(index, keys)| (index + 1, keys))
        .collect();
    let page_count = pages.len();

    if page_count > 0 {
        tracing::debug!(
            catalog = %catalog,
            pages = page_count,
            concurrency = width,
            "Fetching missing ids"
        );
        emit(
            on_progress,
            SyncProgress::FetchingPages {
                catalog,
                pages: page_count,
                concurrency: width,
            },
        );
    }

    let fetch = &fetch;
    let outcomes = run_in_rounds(pages, width, |(page, keys)| async move {
        match fetch(keys.clone()).await {
            Ok(records) => {
                tracing::debug!(catalog = %catalog, page, records = records.len(), "Page fetched");
                emit(
                    on_progress,
                    SyncProgress::PageFetched {
                        catalog,
                        page,
                        records: records.len(),
                    },
                );
                Ok(records)
            }
            Err(error) => {
                tracing::warn!(
                    catalog = %catalog,
                    page,
                    keys = keys.len(),
                    error = %error,
                    "Page failed"
                );
                emit(
                    on_progress,
                    SyncProgress::PageFailed {
                        catalog,
                        page,
                        keys: keys.len(),
                        error: short_error_message(&error),
                    },
                );
                Err(PageFailure { keys, error })
            }
        }
    })
    .await;

    let mut fetched = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(records) => fetched.extend(records),
            Err(failure) => failures.push(failure),
        }
    }

    FetchOutcome {
        pages: page_count,
        fetched,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn partition_splits_hits_and_unique_misses() {
        let keys = [1, 2, 3, 2, 4, 1];
        let cached = vec![Some("a"), None, Some("c"), None, None, Some("a")];
        let parts = partition(&keys, cached);

        assert_eq!(parts.missing, vec![2, 4]);
        assert_eq!(parts.hits.len(), 2);
        assert_eq!(parts.hits.get(&3), Some(&"c"));
    }

    #[tokio::test]
    async fn fetch_pages_splits_by_page_size_and_collects_failures() {
        let seen = Mutex::new(Vec::new());
        let outcome = fetch_pages(
            CatalogKind::ItemNames,
            vec![1, 2, 3, 4, 5],
            2,
            2,
            |keys: Vec<i64>| {
                seen.lock().unwrap().push(keys.clone());
                async move {
                    if keys.contains(&3) {
                        Err(EsiError::Config("boom".to_string()))
                    } else {
                        Ok(keys)
                    }
                }
            },
            None,
        )
        .await;

        assert_eq!(outcome.pages, 3);
        assert_eq!(outcome.fetched, vec![1, 2, 5]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].keys, vec![3, 4]);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![vec![1, 2], vec![3, 4], vec![5]]
        );
    }

    #[tokio::test]
    async fn fetch_pages_with_nothing_missing_does_nothing() {
        let calls = Mutex::new(0usize);
        let outcome: FetchOutcome<i64> = fetch_pages(
            CatalogKind::ItemNames,
            Vec::new(),
            1000,
            10,
            |keys: Vec<i64>| {
                *calls.lock().unwrap() += 1;
                async move { Ok(keys) }
            },
            None,
        )
        .await;

        assert_eq!(outcome.pages, 0);
        assert!(outcome.fetched.is_empty());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn fetch_pages_reports_page_events() {
        let events = std::sync::Arc::new(Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            sink.lock().unwrap().push(format!("{event:?}"));
        });

        let _ = fetch_pages(
            CatalogKind::MarketGroups,
            vec![10, 11],
            1,
            2,
            |keys: Vec<i64>| async move {
                if keys == [11] {
                    Err(EsiError::Config("nope".to_string()))
                } else {
                    Ok(keys)
                }
            },
            Some(&callback),
        )
        .await;

        let events = events.lock().unwrap();
        assert!(events[0].starts_with("FetchingPages"));
        assert!(events.iter().any(|e| e.starts_with("PageFetched")));
        assert!(events.iter().any(|e| e.starts_with("PageFailed")));
    }

    #[test]
    fn phase_tracker_records_transitions() {
        let mut tracker = PhaseTracker::new(CatalogKind::ItemNames);
        assert_eq!(tracker.phase(), SyncPhase::NotStarted);
        tracker.advance(SyncPhase::CacheCheck);
        tracker.advance(SyncPhase::Done);
        assert_eq!(tracker.phase(), SyncPhase::Done);
        assert!(tracker.phase().is_terminal());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "advanced past terminal phase")]
    fn phase_tracker_rejects_leaving_a_terminal_phase() {
        let mut tracker = PhaseTracker::new(CatalogKind::MarketGroups);
        tracker.advance(SyncPhase::CacheCheck);
        tracker.advance(SyncPhase::DoneWithError);
        tracker.advance(SyncPhase::Fetching);
    }
}

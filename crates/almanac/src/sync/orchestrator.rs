//! Catalog resolution entry points.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::error::{AggregateFetchError, PageFailure, PartialCatalog, SyncError};
use super::merge::{PhaseTracker, fetch_pages, partition};
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{SyncOptions, SyncPhase, SyncReport};
use crate::cache::{CatalogCache, GroupCache, NameCache, SyncMarkers};
use crate::catalog::{CatalogKind, ItemNames, MarketGroup, member_universe};
use crate::esi::EsiError;
use crate::source::CatalogSource;

/// Resolves catalogs from the local cache, fetching only what is missing.
///
/// # Example
///
/// ```ignore
/// use almanac::esi::{ESI_BASE_URL, EsiClient};
/// use almanac::sync::CatalogSync;
///
/// let db = almanac::connect_and_migrate("sqlite::memory:").await?;
/// let client = EsiClient::new(ESI_BASE_URL, "my-tool", None)?;
/// let sync = CatalogSync::new(client, db);
/// let names = sync.resolve_item_names().await?;
/// ```
pub struct CatalogSync<S> {
    source: S,
    groups: GroupCache,
    names: NameCache,
    markers: SyncMarkers,
    options: SyncOptions,
    on_progress: Option<ProgressCallback>,
}

impl<S: CatalogSource> CatalogSync<S> {
    pub fn new(source: S, db: impl Into<Arc<DatabaseConnection>>) -> Self {
        let db = db.into();
        Self {
            source,
            groups: GroupCache::new(Arc::clone(&db)),
            names: NameCache::new(Arc::clone(&db)),
            markers: SyncMarkers::new(db),
            options: SyncOptions::default(),
            on_progress: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    fn progress(&self) -> Option<&ProgressCallback> {
        self.on_progress.as_ref()
    }

    fn finish(
        &self,
        tracker: &mut PhaseTracker,
        mut report: SyncReport,
        phase: SyncPhase,
    ) -> SyncReport {
        tracker.advance(phase);
        report.phase = tracker.phase();
        tracing::info!(
            catalog = %report.catalog,
            cache_hits = report.cache_hits,
            fetched = report.fetched,
            failed_pages = report.failed_pages,
            upstream_calls = report.upstream_calls,
            phase = %report.phase,
            "Catalog sync finished"
        );
        emit(
            self.progress(),
            SyncProgress::Finished {
                report: report.clone(),
            },
        );
        report
    }

    /// Every market group definition.
    ///
    /// Once a full sync has succeeded the cached rows are returned, ordered by
    /// id, without any upstream call. Otherwise the id list is fetched and
    /// only uncached groups are requested; the result follows the upstream id
    /// order. The sync marker is recorded only when no group failed and the
    /// listing was not empty.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Source`] if the id list cannot be fetched.
    /// - [`SyncError::Cache`] on database failure.
    /// - [`SyncError::Incomplete`] if some groups failed; the groups that
    ///   did resolve are persisted and carried in the error.
    pub async fn resolve_market_groups(&self) -> Result<Vec<MarketGroup>, SyncError> {
        let catalog = CatalogKind::MarketGroups;
        let mut tracker = PhaseTracker::new(catalog);
        let mut report = SyncReport::new(catalog);

        tracker.advance(SyncPhase::CacheCheck);
        if self.markers.is_set(catalog).await? {
            let groups = self.groups.all().await?;
            report.cache_hits = groups.len();
            emit(
                self.progress(),
                SyncProgress::CacheChecked {
                    catalog,
                    cached: groups.len(),
                    missing: 0,
                },
            );
            self.finish(&mut tracker, report, SyncPhase::Done);
            return Ok(groups);
        }

        let ids = self
            .source
            .market_group_ids()
            .await
            .map_err(SyncError::Source)?;
        report.upstream_calls += 1;

        let cached = self.groups.bulk_get(&ids).await?;
        let mut parts = partition(&ids, cached);
        report.cache_hits = parts.hits.len();
        emit(
            self.progress(),
            SyncProgress::CacheChecked {
                catalog,
                cached: parts.hits.len(),
                missing: parts.missing.len(),
            },
        );

        tracker.advance(SyncPhase::Fetching);
        let source = &self.source;
        let outcome = fetch_pages(
            catalog,
            std::mem::take(&mut parts.missing),
            1,
            self.options.group_concurrency,
            move |keys: Vec<i64>| async move {
                let mut groups = Vec::with_capacity(keys.len());
                for id in keys {
                    groups.push(source.market_group(id).await?);
                }
                Ok::<_, EsiError>(groups)
            },
            self.progress(),
        )
        .await;
        report.upstream_calls += outcome.pages;

        tracker.advance(SyncPhase::Merging);
        let persisted = self.groups.bulk_upsert(outcome.fetched.clone()).await?;
        if persisted > 0 {
            emit(
                self.progress(),
                SyncProgress::Persisted {
                    catalog,
                    count: persisted,
                },
            );
        }
        report.fetched = outcome.fetched.len();
        report.failed_pages = outcome.failures.len();

        let mut resolved = parts.hits;
        resolved.extend(outcome.fetched.into_iter().map(|g| (g.id, g)));
        let groups: Vec<MarketGroup> = ids.iter().filter_map(|id| resolved.remove(id)).collect();

        if !outcome.failures.is_empty() {
            let report = self.finish(&mut tracker, report, SyncPhase::DoneWithError);
            return Err(AggregateFetchError {
                catalog,
                failures: outcome.failures,
                partial: PartialCatalog::Groups(groups),
                report,
            }
            .into());
        }

        // An empty listing is never final; marking it would pin an empty catalog.
        if ids.is_empty() {
            tracing::warn!(catalog = %catalog, "Upstream listed no market groups; sync marker not set");
        } else {
            self.markers.set(catalog).await?;
            emit(self.progress(), SyncProgress::MarkerSet { catalog });
        }
        self.finish(&mut tracker, report, SyncPhase::Done);
        Ok(groups)
    }

    /// Names for every item type referenced by a market group.
    ///
    /// If market group resolution is incomplete, names are still resolved
    /// for the groups that did load and the group failures are carried into
    /// this call's error.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Source`] or [`SyncError::Cache`] as for
    ///   [`resolve_market_groups`](Self::resolve_market_groups).
    /// - [`SyncError::Incomplete`] if any group or name page failed; every
    ///   name that did resolve is persisted and carried in the error.
    pub async fn resolve_item_names(&self) -> Result<ItemNames, SyncError> {
        let (groups, mut failures) = match self.resolve_market_groups().await {
            Ok(groups) => (groups, Vec::new()),
            Err(SyncError::Incomplete(err)) => match err.partial {
                PartialCatalog::Groups(groups) => (groups, err.failures),
                PartialCatalog::Names(_) => (Vec::new(), err.failures),
            },
            Err(err) => return Err(err),
        };

        let catalog = CatalogKind::ItemNames;
        let mut tracker = PhaseTracker::new(catalog);
        let ids = member_universe(&groups);
        let (names, mut report, name_failures) =
            self.resolve_names_for(&ids, &mut tracker).await?;

        failures.extend(name_failures);
        report.failed_pages = failures.len();

        if failures.is_empty() {
            self.finish(&mut tracker, report, SyncPhase::Done);
            return Ok(names);
        }

        let report = self.finish(&mut tracker, report, SyncPhase::DoneWithError);
        Err(AggregateFetchError {
            catalog,
            failures,
            partial: PartialCatalog::Names(names),
            report,
        }
        .into())
    }

    /// Resolve names for an explicit id list through the name cache.
    ///
    /// Returns the resolved map, the report so far (phase not yet terminal),
    /// and the failed pages.
    async fn resolve_names_for(
        &self,
        ids: &[i64],
        tracker: &mut PhaseTracker,
    ) -> Result<(ItemNames, SyncReport, Vec<PageFailure>), SyncError> {
        let catalog = CatalogKind::ItemNames;
        let mut report = SyncReport::new(catalog);

        tracker.advance(SyncPhase::CacheCheck);
        let cached = self.names.bulk_get(ids).await?;
        let parts = partition(ids, cached);
        report.cache_hits = parts.hits.len();
        emit(
            self.progress(),
            SyncProgress::CacheChecked {
                catalog,
                cached: parts.hits.len(),
                missing: parts.missing.len(),
            },
        );

        let mut names: ItemNames = parts
            .hits
            .into_values()
            .map(|name| name.into_entry())
            .collect();

        if parts.missing.is_empty() {
            return Ok((names, report, Vec::new()));
        }

        tracker.advance(SyncPhase::Fetching);
        let source = &self.source;
        let outcome = fetch_pages(
            catalog,
            parts.missing,
            self.options.effective_name_page_size(),
            self.options.name_concurrency,
            move |keys: Vec<i64>| async move { source.resolve_names(&keys).await },
            self.progress(),
        )
        .await;
        report.upstream_calls = outcome.pages;

        tracker.advance(SyncPhase::Merging);
        let persisted = self.names.bulk_upsert(outcome.fetched.clone()).await?;
        if persisted > 0 {
            emit(
                self.progress(),
                SyncProgress::Persisted {
                    catalog,
                    count: persisted,
                },
            );
        }
        report.fetched = outcome.fetched.len();
        names.extend(outcome.fetched.into_iter().map(|name| name.into_entry()));

        Ok((names, report, outcome.failures))
    }
}

impl<S> std::fmt::Debug for CatalogSync<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSync")
            .field("options", &self.options)
            .field("on_progress", &self.on_progress.is_some())
            .finish_non_exhaustive()
    }
}

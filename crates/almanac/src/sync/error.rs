//! Error types for catalog syncs.

use std::fmt;

use thiserror::Error;

use super::types::SyncReport;
use crate::cache::CacheError;
use crate::catalog::{CatalogKind, ItemNames, MarketGroup};
use crate::esi::EsiError;

/// One upstream page that could not be fetched or validated.
#[derive(Debug, Clone, Error)]
#[error("page of {} id(s) starting at {}: {error}", keys.len(), first_key(keys))]
pub struct PageFailure {
    /// Ids the page asked for.
    pub keys: Vec<i64>,
    pub error: EsiError,
}

fn first_key(keys: &[i64]) -> String {
    keys.first()
        .map(i64::to_string)
        .unwrap_or_else(|| "-".to_string())
}

/// Whatever a failed sync did manage to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialCatalog {
    Groups(Vec<MarketGroup>),
    Names(ItemNames),
}

impl PartialCatalog {
    pub fn len(&self) -> usize {
        match self {
            PartialCatalog::Groups(groups) => groups.len(),
            PartialCatalog::Names(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raised once every page of a sync has settled and at least one failed.
///
/// Successful pages are already persisted when this is returned; `partial`
/// holds everything the call could resolve.
#[derive(Debug, Clone)]
pub struct AggregateFetchError {
    pub catalog: CatalogKind,
    pub failures: Vec<PageFailure>,
    pub partial: PartialCatalog,
    pub report: SyncReport,
}

impl AggregateFetchError {
    /// Partial group set, when this is a market group failure.
    pub fn partial_groups(&self) -> Option<&[MarketGroup]> {
        match &self.partial {
            PartialCatalog::Groups(groups) => Some(groups),
            PartialCatalog::Names(_) => None,
        }
    }

    /// Partial name map, when this is a name failure.
    pub fn partial_names(&self) -> Option<&ItemNames> {
        match &self.partial {
            PartialCatalog::Names(names) => Some(names),
            PartialCatalog::Groups(_) => None,
        }
    }

    /// Ids of every failed page, in failure order.
    pub fn failed_keys(&self) -> Vec<i64> {
        self.failures
            .iter()
            .flat_map(|f| f.keys.iter().copied())
            .collect()
    }
}

impl fmt::Display for AggregateFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sync incomplete: {} page(s) failed, {} record(s) resolved",
            self.catalog,
            self.failures.len(),
            self.partial.len()
        )?;
        if let Some(first) = self.failures.first() {
            write!(f, " (first failure: {first})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateFetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|f| &f.error as &(dyn std::error::Error + 'static))
    }
}

/// Errors returned by the resolve entry points.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The upstream id listing failed; there was nothing to merge.
    #[error("Failed to list catalog ids: {0}")]
    Source(#[source] EsiError),

    /// The local store failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Some pages failed; the rest were persisted.
    #[error(transparent)]
    Incomplete(#[from] AggregateFetchError),
}

impl SyncError {
    /// The aggregate failure, if this error carries partial results.
    pub fn as_incomplete(&self) -> Option<&AggregateFetchError> {
        match self {
            SyncError::Incomplete(err) => Some(err),
            _ => None,
        }
    }
}

//! Durable local caches for the mirrored catalogs.
//!
//! Tables are append/overwrite only: rows are never evicted or expired. The
//! only freshness signal is the per-catalog sync marker kept by
//! [`SyncMarkers`].

mod error;
mod groups;
mod markers;
mod names;

use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;

pub use error::{CacheError, Result};
pub use groups::GroupCache;
pub use markers::SyncMarkers;
pub use names::NameCache;

/// Upper bound on bind parameters per statement, SQLite's historical default.
pub(crate) const MAX_BIND_PARAMS: usize = 999;

/// A keyed, durable catalog table.
#[async_trait]
pub trait CatalogCache: Send + Sync {
    type Key: Copy + Eq + Hash + Send + Sync;
    type Record: Clone + Send + Sync;

    /// Look up one record.
    async fn get(&self, key: Self::Key) -> Result<Option<Self::Record>> {
        Ok(self.bulk_get(&[key]).await?.pop().flatten())
    }

    /// Look up many records.
    ///
    /// The result has the same length and order as `keys`; duplicate keys
    /// resolve to the same record.
    async fn bulk_get(&self, keys: &[Self::Key]) -> Result<Vec<Option<Self::Record>>>;

    /// Insert or overwrite records by key. Empty input is a no-op.
    ///
    /// Returns the number of records written.
    async fn bulk_upsert(&self, records: Vec<Self::Record>) -> Result<u64>;

    /// Every cached record, ordered by key.
    async fn all(&self) -> Result<Vec<Self::Record>>;

    /// Number of cached records.
    async fn count(&self) -> Result<u64>;
}

/// Drop duplicate keys, keeping the last record for each key in first-seen
/// position.
///
/// A single multi-row upsert may not touch the same row twice on every
/// backend.
pub(crate) fn dedupe_last_wins<K, R>(records: Vec<R>, key: impl Fn(&R) -> K) -> Vec<R>
where
    K: Eq + Hash,
{
    let mut slots: HashMap<K, usize> = HashMap::with_capacity(records.len());
    let mut out: Vec<R> = Vec::with_capacity(records.len());
    for record in records {
        match slots.get(&key(&record)) {
            Some(&slot) => out[slot] = record,
            None => {
                slots.insert(key(&record), out.len());
                out.push(record);
            }
        }
    }
    out
}

/// Unique keys of `keys`, in first-seen order.
pub(crate) fn unique_keys<K: Copy + Eq + Hash>(keys: &[K]) -> Vec<K> {
    let mut seen = std::collections::HashSet::with_capacity(keys.len());
    keys.iter().copied().filter(|k| seen.insert(*k)).collect()
}

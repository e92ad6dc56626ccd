//! The upstream boundary used by the sync orchestrators.

use async_trait::async_trait;

use crate::catalog::{ItemName, MarketGroup};
use crate::esi::EsiError;

/// Upstream catalog operations.
///
/// [`EsiClient`](crate::esi::EsiClient) is the production implementation.
/// Each method is one budget-gated request.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// All market group ids, in upstream order.
    async fn market_group_ids(&self) -> Result<Vec<i64>, EsiError>;

    /// One market group definition.
    async fn market_group(&self, id: i64) -> Result<MarketGroup, EsiError>;

    /// Resolve names for at most [`NAMES_PAGE_LIMIT`](crate::esi::NAMES_PAGE_LIMIT) ids.
    async fn resolve_names(&self, ids: &[i64]) -> Result<Vec<ItemName>, EsiError>;
}

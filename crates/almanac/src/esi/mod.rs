//! EVE Swagger Interface (ESI) client.
//!
//! # Module Structure
//!
//! - [`budget`] - The shared error budget gating every request
//! - [`rate_limit`] - Optional proactive pacing
//! - [`error`] - Error types for ESI requests
//! - [`types`] - Wire payloads
//! - [`client`] - Client creation and the [`CatalogSource`](crate::source::CatalogSource) impl

mod budget;
mod client;
mod error;
mod rate_limit;
mod types;

pub use budget::{
    BudgetSnapshot, DEFAULT_REMAINING, DEFAULT_RESET_SECONDS, ERROR_LIMIT_REMAIN_HEADER,
    ERROR_LIMIT_RESET_HEADER, ErrorBudget, LOW_WATERMARK,
};
pub use client::{DEFAULT_COMPONENT_NAME, ESI_BASE_URL, EsiClient, NAMES_PAGE_LIMIT, user_agent};
pub use error::{EsiError, short_error_message};
pub use rate_limit::ApiRateLimiter;
pub use types::{EsiMarketGroup, EsiName};

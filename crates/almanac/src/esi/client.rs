//! ESI client creation and request plumbing.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::budget::ErrorBudget;
use super::error::EsiError;
use super::rate_limit::ApiRateLimiter;
use super::types::{EsiMarketGroup, EsiName};
use crate::catalog::{ItemName, MarketGroup};
use crate::http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::source::CatalogSource;

/// Public ESI base URL.
pub const ESI_BASE_URL: &str = "https://esi.evetech.net/latest";

/// Maximum ids accepted by one `POST /universe/names/` call.
pub const NAMES_PAGE_LIMIT: usize = 1000;

/// Default component name sent in the `User-Agent` header.
pub const DEFAULT_COMPONENT_NAME: &str = "almanac";

/// Build the `User-Agent` ESI sees.
///
/// ESI asks callers to identify themselves and leave a way to be reached, so
/// the component name and an optional contact (an email or a URL) ride along
/// after the library's own name and version:
/// `almanac/0.1.0 (industry-planner; ops@example.com)`.
#[must_use]
pub fn user_agent(component_name: &str, contact: Option<&str>) -> String {
    let base = concat!("almanac/", env!("CARGO_PKG_VERSION"));
    let component = component_name.trim();
    let details: Vec<&str> = [
        Some(component).filter(|c| !c.is_empty() && *c != DEFAULT_COMPONENT_NAME),
        contact.map(str::trim).filter(|c| !c.is_empty()),
    ]
    .into_iter()
    .flatten()
    .collect();

    if details.is_empty() {
        base.to_string()
    } else {
        format!("{base} ({})", details.join("; "))
    }
}

/// ESI client.
///
/// Every request waits on the optional rate limiter and the shared
/// [`ErrorBudget`] before it is sent, and feeds the response back into the
/// budget.
#[derive(Clone)]
pub struct EsiClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    component_name: String,
    user_agent: String,
    budget: ErrorBudget,
    rate_limiter: Option<ApiRateLimiter>,
}

impl EsiClient {
    /// Create a client backed by reqwest with a 30 second timeout.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use almanac::esi::{ESI_BASE_URL, EsiClient};
    ///
    /// let client = EsiClient::new(ESI_BASE_URL, "my-industry-tool", None)?;
    /// let ids = client.fetch_market_group_ids().await?;
    /// ```
    pub fn new(
        base_url: &str,
        component_name: &str,
        rate_limiter: Option<ApiRateLimiter>,
    ) -> Result<Self, EsiError> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(30))
            .map_err(|e| EsiError::Config(e.to_string()))?;

        Ok(Self::new_with_transport(
            base_url,
            component_name,
            rate_limiter,
            ErrorBudget::default(),
            Arc::new(transport),
        ))
    }

    pub fn new_with_transport(
        base_url: &str,
        component_name: &str,
        rate_limiter: Option<ApiRateLimiter>,
        budget: ErrorBudget,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            component_name: component_name.to_string(),
            user_agent: user_agent(component_name, None),
            budget,
            rate_limiter,
        }
    }

    /// Add a contact to the `User-Agent` so ESI operators can reach the caller.
    #[must_use]
    pub fn with_contact(mut self, contact: &str) -> Self {
        self.user_agent = user_agent(&self.component_name, Some(contact));
        self
    }

    /// The `User-Agent` sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The error budget shared by every request from this client.
    pub fn budget(&self) -> &ErrorBudget {
        &self.budget
    }

    /// Wait for rate limiter if one is configured.
    async fn wait_for_rate_limit(&self) {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, path: &str, request: HttpRequest) -> Result<HttpResponse, EsiError> {
        self.wait_for_rate_limit().await;
        self.budget.before_request().await;

        tracing::debug!(method = %request.method, path, "ESI request");
        let response = self.transport.send(request).await?;
        self.budget.after_response(response.status, &response.headers);

        if !response.is_success() {
            return Err(EsiError::Status {
                status: response.status,
                path: path.to_string(),
                message: response.text(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, EsiError> {
        let request = HttpRequest::get(self.url(path), &self.user_agent);
        let response = self.send(path, request).await?;
        serde_json::from_slice(&response.body).map_err(|e| EsiError::validation(path, e.to_string()))
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, EsiError> {
        let body = serde_json::to_vec(body).map_err(|e| EsiError::Encode(e.to_string()))?;
        let request = HttpRequest::post_json(self.url(path), &self.user_agent, body);
        let response = self.send(path, request).await?;
        serde_json::from_slice(&response.body).map_err(|e| EsiError::validation(path, e.to_string()))
    }

    /// `GET /markets/groups/`
    pub async fn fetch_market_group_ids(&self) -> Result<Vec<i64>, EsiError> {
        self.get_json("/markets/groups/").await
    }

    /// `GET /markets/groups/{id}/`
    pub async fn fetch_market_group(&self, id: i64) -> Result<MarketGroup, EsiError> {
        let path = format!("/markets/groups/{id}/");
        let group: EsiMarketGroup = self.get_json(&path).await?;
        if group.market_group_id != id {
            return Err(EsiError::validation(
                &path,
                format!("expected group {id}, got {}", group.market_group_id),
            ));
        }
        Ok(group.into())
    }

    /// `POST /universe/names/`
    ///
    /// An empty id list returns an empty result without a request.
    pub async fn fetch_names(&self, ids: &[i64]) -> Result<Vec<ItemName>, EsiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > NAMES_PAGE_LIMIT {
            return Err(EsiError::TooManyIds {
                count: ids.len(),
                limit: NAMES_PAGE_LIMIT,
            });
        }

        let entries: Vec<EsiName> = self.post_json("/universe/names/", ids).await?;
        Ok(entries.into_iter().map(ItemName::from).collect())
    }
}

#[async_trait]
impl CatalogSource for EsiClient {
    async fn market_group_ids(&self) -> Result<Vec<i64>, EsiError> {
        self.fetch_market_group_ids().await
    }

    async fn market_group(&self, id: i64) -> Result<MarketGroup, EsiError> {
        self.fetch_market_group(id).await
    }

    async fn resolve_names(&self, ids: &[i64]) -> Result<Vec<ItemName>, EsiError> {
        self.fetch_names(ids).await
    }
}

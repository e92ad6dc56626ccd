//! The HTTP boundary between the ESI client and the network.
//!
//! ESI only ever sees two request shapes from almanac: a bare `GET` for the
//! market group endpoints and a `POST` of a JSON id array to
//! `/universe/names/`. Responses matter for their status, their body, and the
//! `X-ESI-Error-Limit-*` headers that drive the error budget.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::esi::{ERROR_LIMIT_REMAIN_HEADER, ERROR_LIMIT_RESET_HEADER};

const JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        })
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Header list with case-insensitive lookup. Order is preserved and the first
/// match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders(Vec<(String, String)>);

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The ESI error limit headers, each `None` when absent or not a
    /// non-negative integer.
    #[must_use]
    pub fn error_limit(&self) -> ErrorLimit {
        let number = |name: &str| self.get(name)?.trim().parse::<u32>().ok();
        ErrorLimit {
            remaining: number(ERROR_LIMIT_REMAIN_HEADER),
            reset_seconds: number(ERROR_LIMIT_RESET_HEADER),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HttpHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// What a response said about the ESI error window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorLimit {
    pub remaining: Option<u32>,
    pub reset_seconds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// A `GET` that accepts JSON.
    pub fn get(url: impl Into<String>, user_agent: &str) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: [("Accept", JSON), ("User-Agent", user_agent)]
                .into_iter()
                .collect(),
            body: Vec::new(),
        }
    }

    /// A `POST` carrying an already encoded JSON body.
    pub fn post_json(url: impl Into<String>, user_agent: &str, body: Vec<u8>) -> Self {
        let mut request = Self::get(url, user_agent);
        request.method = HttpMethod::Post;
        request.headers.insert("Content-Type", JSON);
        request.body = body;
        request
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as text, for error messages.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),
}

/// Transport boundary for all HTTP I/O.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// The production transport, backed by reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self.client.request(request.method.into(), &request.url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        // Non-ASCII header values are dropped; none of the ones ESI sends matter.
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)))
            .collect();

        let body = resp
            .bytes()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

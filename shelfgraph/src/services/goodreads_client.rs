//! Goodreads API client
//!
//! XML endpoints, key-authenticated, rate limited, with an optional
//! SQLite response cache in front of the network.

use super::response_cache::ResponseCache;
use super::{xml_tree, CatalogService, RawPage, RequestParams};
use async_trait::async_trait;
use serde_json::Value;
use shelfgraph_common::{Error, Result};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const GOODREADS_BASE_URL: &str = "https://www.goodreads.com";
const USER_AGENT: &str = concat!("shelfgraph/", env!("CARGO_PKG_VERSION"));
const RESPONSE_ROOT: &str = "GoodreadsResponse";

/// Connection settings for [`GoodreadsClient`]
#[derive(Debug, Clone)]
pub struct GoodreadsClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub requests_per_second: u32,
    pub timeout: Duration,
}

impl GoodreadsClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: GOODREADS_BASE_URL.to_string(),
            api_key: api_key.into(),
            requests_per_second: 1,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Goodreads catalog client
pub struct GoodreadsClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    cache: Option<ResponseCache>,
}

impl GoodreadsClient {
    pub fn new(config: GoodreadsClientConfig, cache: Option<ResponseCache>) -> Result<Self> {
        let per_second = NonZeroU32::new(config.requests_per_second).ok_or_else(|| {
            Error::Config("requests_per_second must be at least 1".to_string())
        })?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::RemoteService(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            rate_limiter: governor::RateLimiter::direct(governor::Quota::per_second(per_second)),
            cache,
        })
    }

    /// GET one endpoint and return the raw response body
    async fn fetch_body(&self, endpoint: &str, params: &RequestParams) -> Result<String> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(url = %url, ?params, "Querying catalog API");

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .query(&[("format", "xml"), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::RemoteService(format!("{} request failed: {}", endpoint, e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::RemoteService(format!("{} not found: {:?}", endpoint, params)));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(Error::RemoteService(format!("{} rate limited ({})", endpoint, status)));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let excerpt: String = error_text.chars().take(200).collect();
            return Err(Error::RemoteService(format!(
                "{} returned {}: {}",
                endpoint, status, excerpt
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::RemoteService(format!("{} body read failed: {}", endpoint, e)))
    }
}

/// Parse an API response body and strip the response envelope
pub fn parse_response(body: &str) -> Result<RawPage> {
    let tree = xml_tree::xml_to_tree(body)?;
    match tree {
        Value::Object(mut fields) => fields
            .remove(RESPONSE_ROOT)
            .map(RawPage::new)
            .ok_or_else(|| {
                let roots: Vec<String> = fields.keys().cloned().collect();
                Error::RemoteService(format!("unexpected response root: {}", roots.join(", ")))
            }),
        _ => Err(Error::RemoteService("empty response document".to_string())),
    }
}

#[async_trait]
impl CatalogService for GoodreadsClient {
    async fn request(&self, endpoint: &str, params: &RequestParams) -> Result<RawPage> {
        let key = ResponseCache::cache_key(endpoint, params);

        if let Some(cache) = &self.cache {
            match cache.get(&key).await {
                Ok(Some(body)) => {
                    debug!(key = %key, "Serving catalog response from cache");
                    return parse_response(&body);
                }
                Ok(None) => {}
                Err(e) => warn!("Response cache read failed, fetching: {}", e),
            }
        }

        let body = self.fetch_body(endpoint, params).await?;
        let page = parse_response(&body)?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, &body).await {
                warn!("Response cache write failed (response still used): {}", e);
            }
        }

        info!(key = %key, bytes = body.len(), "Fetched catalog response");
        Ok(page)
    }
}

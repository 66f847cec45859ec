//! In-memory catalog service
//!
//! Serves canned pages keyed by `(endpoint, id, page)` and records every
//! request it receives.

use async_trait::async_trait;
use shelfgraph::services::{CatalogService, RawPage, RequestParams};
use shelfgraph::Error;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

type PageKey = (String, u64, u64);

#[derive(Default)]
pub struct FakeCatalog {
    pages: HashMap<PageKey, RawPage>,
    failing: HashSet<PageKey>,
    delays: HashMap<PageKey, Duration>,
    requests: Mutex<Vec<PageKey>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, endpoint: &str, id: u64, page: u64, body: RawPage) -> Self {
        self.pages.insert((endpoint.to_string(), id, page), body);
        self
    }

    pub fn with_failure(mut self, endpoint: &str, id: u64, page: u64) -> Self {
        self.failing.insert((endpoint.to_string(), id, page));
        self
    }

    /// Hold the response for `page` back by `delay`
    pub fn with_delay(mut self, endpoint: &str, id: u64, page: u64, delay: Duration) -> Self {
        self.delays.insert((endpoint.to_string(), id, page), delay);
        self
    }

    /// `(endpoint, id, page)` of every request, in arrival order
    pub fn requests(&self) -> Vec<PageKey> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn numeric_param(params: &RequestParams, name: &str) -> Result<u64, Error> {
    params
        .get(name)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| Error::RemoteService(format!("missing {} parameter", name)))
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn request(&self, endpoint: &str, params: &RequestParams) -> shelfgraph::Result<RawPage> {
        let key = (
            endpoint.to_string(),
            numeric_param(params, "id")?,
            numeric_param(params, "page")?,
        );
        self.requests.lock().unwrap().push(key.clone());

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(&key) {
            return Err(Error::RemoteService(format!("{} page {} failed", key.0, key.2)));
        }

        self.pages
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::RemoteService(format!("{} id {} not found", key.0, key.1)))
    }
}

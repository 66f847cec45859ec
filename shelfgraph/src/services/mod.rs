//! Catalog service boundary
//!
//! The pipeline only sees [`CatalogService`]; transport, rate limiting and
//! response caching live behind it.

pub mod goodreads_client;
pub mod response_cache;
pub mod xml_tree;

pub use goodreads_client::{GoodreadsClient, GoodreadsClientConfig};
pub use response_cache::ResponseCache;

use crate::models::EntityKind;
use async_trait::async_trait;
use serde_json::Value;
use shelfgraph_common::{Error, Result};
use std::collections::BTreeMap;

/// Query parameters of a catalog request, sorted by name
pub type RequestParams = BTreeMap<String, String>;

/// Remote catalog of works
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch one response from `endpoint`
    ///
    /// Failures of any kind surface as [`Error::RemoteService`]. No retry.
    async fn request(&self, endpoint: &str, params: &RequestParams) -> Result<RawPage>;
}

/// One page of a paginated listing, as a nested tree
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    body: Value,
}

impl RawPage {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    fn total_path(kind: EntityKind) -> &'static [&'static str] {
        match kind {
            EntityKind::Author => &["author", "books", "@total"],
            EntityKind::Collection => &["series", "series_works_count"],
        }
    }

    fn entries_path(kind: EntityKind) -> &'static [&'static str] {
        match kind {
            EntityKind::Author => &["author", "books", "book"],
            EntityKind::Collection => &["series", "series_works", "series_work"],
        }
    }

    /// Total number of works in the whole listing
    pub fn total(&self, kind: EntityKind) -> Result<u64> {
        let path = Self::total_path(kind);
        let text = xml_tree::lookup(&self.body, path)
            .and_then(xml_tree::scalar_text)
            .ok_or_else(|| {
                Error::RemoteService(format!("{} listing has no total at {}", kind, path.join(".")))
            })?;
        text.parse().map_err(|e| {
            Error::RemoteService(format!("{} listing total {:?} is not a count: {}", kind, text, e))
        })
    }

    /// Per-work entries on this page (possibly none)
    pub fn entries(&self, kind: EntityKind) -> Vec<&Value> {
        xml_tree::one_or_many(xml_tree::lookup(&self.body, Self::entries_path(kind)))
    }
}

//! Catalog aggregation pipeline
//!
//! retrieve → normalize → filter → rank. Rendering and the interactive loop
//! live in [`crate::visualize`].

pub mod filter;
pub mod normalizer;
pub mod ranking;
pub mod retriever;

pub use filter::filter;
pub use normalizer::{normalize, AuthorEntry, CatalogEntry, CollectionEntry, OneOrMany, TextNode};
pub use ranking::rank;
pub use retriever::{fetch_all, page_bound};

use crate::models::{PipelineRequest, WorkRecord};
use crate::services::CatalogService;
use shelfgraph_common::Result;

/// Fetch, normalize and filter everything the entity's chart can show
///
/// The result is ranked repeatedly by the visualization loop without refetching.
pub async fn load_records(
    service: &dyn CatalogService,
    request: &PipelineRequest,
    fetch_concurrency: usize,
) -> Result<Vec<WorkRecord>> {
    let kind = request.entity.kind;
    let pages = fetch_all(service, &request.entity, kind.page_size(), fetch_concurrency).await?;
    let records = normalize(&pages, kind)?;
    Ok(filter(records, request))
}

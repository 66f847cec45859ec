//! Paginated retrieval of an entity's listing
//!
//! Page 1 carries the total count; the remaining pages are independent and
//! may be fetched concurrently, but are always returned in page order.

use crate::models::EntityReference;
use crate::services::{CatalogService, RawPage, RequestParams};
use futures::stream::{self, StreamExt, TryStreamExt};
use shelfgraph_common::Result;
use tracing::{debug, info};

/// Exclusive upper bound of the page numbers to request
///
/// `ceil(total / page_size) + 1`, so pages `1..page_bound` cover the listing.
/// A zero total still yields bound 1 (just the first page).
pub fn page_bound(total: u64, page_size: u32) -> u64 {
    let page_size = u64::from(page_size.max(1));
    total.div_ceil(page_size) + 1
}

fn page_params(entity: &EntityReference, page: u64) -> RequestParams {
    RequestParams::from([
        ("id".to_string(), entity.id.to_string()),
        ("page".to_string(), page.to_string()),
    ])
}

/// Fetch every page of `entity`'s listing
///
/// All-or-nothing: any failed page fails the whole retrieval.
pub async fn fetch_all(
    service: &dyn CatalogService,
    entity: &EntityReference,
    page_size: u32,
    concurrency: usize,
) -> Result<Vec<RawPage>> {
    let endpoint = entity.kind.endpoint();

    let first = service.request(endpoint, &page_params(entity, 1)).await?;
    let total = first.total(entity.kind)?;
    let bound = page_bound(total, page_size);

    debug!(entity = %entity, total, pages = bound - 1, "Listing size known");

    let rest: Vec<RawPage> = stream::iter(2..bound)
        .map(|page| {
            let params = page_params(entity, page);
            async move { service.request(endpoint, &params).await }
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let mut pages = Vec::with_capacity(rest.len() + 1);
    pages.push(first);
    pages.extend(rest);

    info!(entity = %entity, total, pages = pages.len(), "Retrieved listing");
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bound() {
        assert_eq!(page_bound(0, 100), 1);
        assert_eq!(page_bound(1, 100), 2);
        assert_eq!(page_bound(100, 100), 2);
        assert_eq!(page_bound(101, 100), 3);
        assert_eq!(page_bound(45, 30), 3);
        assert_eq!(page_bound(90, 30), 4);
    }

    #[test]
    fn test_page_bound_is_ceil_plus_one() {
        for total in 1..500u64 {
            for size in [1u32, 7, 30, 100] {
                let ceil = (total as f64 / size as f64).ceil() as u64;
                assert_eq!(page_bound(total, size), ceil + 1, "total={} size={}", total, size);
            }
        }
    }
}

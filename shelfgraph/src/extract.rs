//! Catalog URL → entity identifier
//!
//! Example URLs:
//! - Author: `https://www.goodreads.com/author/show/2565.Ian_Fleming`
//! - Series: `https://www.goodreads.com/series/49397-james-bond---extended-series`

use crate::models::{EntityKind, EntityReference};
use regex::Regex;
use shelfgraph_common::{Error, Result};
use std::sync::OnceLock;

fn author_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/author/show/(\d+)\.").expect("valid author regex"))
}

fn collection_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/series/(\d+)-").expect("valid series regex"))
}

/// Extract the entity id from a catalog URL of the given kind
pub fn extract(url: &str, kind: EntityKind) -> Result<EntityReference> {
    let url = url.trim();
    let pattern = match kind {
        EntityKind::Author => author_pattern(),
        EntityKind::Collection => collection_pattern(),
    };

    let digits = pattern
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::MalformedUrl(format!("not a {} URL: {}", kind, url)))?;

    let id: u64 = digits
        .parse()
        .map_err(|e| Error::MalformedUrl(format!("bad {} id in {}: {}", kind, url, e)))?;

    if id == 0 {
        return Err(Error::MalformedUrl(format!("{} id must be positive: {}", kind, url)));
    }

    Ok(EntityReference { kind, id })
}

//! Raw listing pages → flat work records
//!
//! Each listing entry is deserialized into the typed [`CatalogEntry`] variant
//! for its entity kind, then normalized by that variant's own function. A
//! missing required field aborts normalization with [`Error::MalformedRecord`].

use crate::models::{EntityKind, WorkDetail, WorkRecord};
use crate::services::RawPage;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use shelfgraph_common::{Error, Result};
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::debug;

/// Leaf text of a converted XML element
///
/// Accepts a bare string or number, an `{"@type": .., "#text": ..}` node, or
/// `null` for an empty element. Blank text counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "LeafShape")]
pub struct TextNode(Option<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum LeafShape {
    Text(String),
    Number(serde_json::Number),
    Node {
        #[serde(rename = "#text", default)]
        text: Option<String>,
    },
    Empty,
}

impl From<LeafShape> for TextNode {
    fn from(shape: LeafShape) -> Self {
        let text = match shape {
            LeafShape::Text(s) => Some(s),
            LeafShape::Number(n) => Some(n.to_string()),
            LeafShape::Node { text } => text,
            LeafShape::Empty => None,
        };
        TextNode(text.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
    }
}

impl TextNode {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// This node's text, else `fallback`'s
    fn or<'a>(&'a self, fallback: &'a TextNode) -> &'a TextNode {
        if self.0.is_some() {
            self
        } else {
            fallback
        }
    }
}

/// Repeated XML element: one child arrives as a single value, several as a list
#[derive(Debug, Clone, PartialEq)]
pub struct OneOrMany<T>(Vec<T>);

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OneOrMany<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape<T> {
            Many(Vec<T>),
            One(T),
            Empty,
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Many(items) => OneOrMany(items),
            Shape::One(item) => OneOrMany(vec![item]),
            Shape::Empty => OneOrMany(Vec::new()),
        })
    }
}

/// Series listing entry (`series_work`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionEntry {
    /// Position within the series, as listed
    #[serde(default)]
    pub user_position: TextNode,
    pub work: SeriesWork,
}

/// Work-level fields of a series entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeriesWork {
    #[serde(default)]
    pub title: TextNode,
    #[serde(default)]
    pub ratings_sum: TextNode,
    #[serde(default)]
    pub ratings_count: TextNode,
    /// Best edition; its fields win over the work's
    pub best_book: BestBook,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BestBook {
    #[serde(default)]
    pub title: TextNode,
    #[serde(default)]
    pub ratings_sum: TextNode,
    #[serde(default)]
    pub ratings_count: TextNode,
}

/// Author listing entry (`book`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthorEntry {
    /// Book id, usually `{"@type": "integer", "#text": ".."}`
    #[serde(default)]
    pub id: TextNode,
    #[serde(default)]
    pub title: TextNode,
    #[serde(default)]
    pub title_without_series: TextNode,
    #[serde(default)]
    pub average_rating: TextNode,
    #[serde(default)]
    pub ratings_count: TextNode,
    #[serde(default)]
    pub ratings_sum: TextNode,
    #[serde(default)]
    pub authors: Option<AuthorList>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthorList {
    #[serde(default)]
    pub author: OneOrMany<AuthorRef>,
}

/// Credited author of a book
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthorRef {
    #[serde(default)]
    pub id: TextNode,
    #[serde(default)]
    pub name: TextNode,
}

/// Listing entry, tagged by entity kind
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntry {
    Collection(CollectionEntry),
    Author(AuthorEntry),
}

struct EntryContext {
    kind: EntityKind,
    index: usize,
}

impl EntryContext {
    fn malformed(&self, message: impl std::fmt::Display) -> Error {
        Error::MalformedRecord(format!("{} entry {}: {}", self.kind, self.index, message))
    }

    fn text<'a>(&self, node: &'a TextNode, field: &str) -> Result<&'a str> {
        node.as_deref()
            .ok_or_else(|| self.malformed(format!("missing {}", field)))
    }

    fn number<T>(&self, node: &TextNode, field: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let text = self.text(node, field)?;
        text.parse()
            .map_err(|e| self.malformed(format!("{} {:?} is not a number: {}", field, text, e)))
    }

    fn optional_number<T>(&self, node: &TextNode, field: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match node.as_deref() {
            Some(_) => self.number(node, field).map(Some),
            None => Ok(None),
        }
    }
}

impl CatalogEntry {
    /// Deserialize one raw entry into the variant for `kind`
    pub fn from_value(kind: EntityKind, index: usize, value: &Value) -> Result<Self> {
        let ctx = EntryContext { kind, index };
        match kind {
            EntityKind::Collection => CollectionEntry::deserialize(value)
                .map(CatalogEntry::Collection)
                .map_err(|e| ctx.malformed(e)),
            EntityKind::Author => AuthorEntry::deserialize(value)
                .map(CatalogEntry::Author)
                .map_err(|e| ctx.malformed(e)),
        }
    }

    /// Flatten into a [`WorkRecord`]
    pub fn normalize(self, index: usize) -> Result<WorkRecord> {
        match self {
            CatalogEntry::Collection(entry) => normalize_collection(entry, index),
            CatalogEntry::Author(entry) => normalize_author(entry, index),
        }
    }
}

fn normalize_collection(entry: CollectionEntry, index: usize) -> Result<WorkRecord> {
    let ctx = EntryContext {
        kind: EntityKind::Collection,
        index,
    };
    let work = &entry.work;
    let best = &work.best_book;

    // Best-edition fields win on collision
    let title = ctx.text(best.title.or(&work.title), "title")?.to_string();
    let ratings_sum: u64 = ctx.number(best.ratings_sum.or(&work.ratings_sum), "ratings_sum")?;
    let ratings_count: u64 =
        ctx.number(best.ratings_count.or(&work.ratings_count), "ratings_count")?;
    let average_rating = (ratings_count > 0).then(|| ratings_sum as f64 / ratings_count as f64);

    Ok(WorkRecord {
        title,
        ratings_sum: Some(ratings_sum),
        ratings_count,
        average_rating,
        detail: WorkDetail::Collection {
            series_position: entry.user_position.0,
        },
    })
}

fn normalize_author(entry: AuthorEntry, index: usize) -> Result<WorkRecord> {
    let ctx = EntryContext {
        kind: EntityKind::Author,
        index,
    };

    let book_id: u64 = ctx.number(&entry.id, "id")?;
    let title = ctx.text(&entry.title, "title")?.to_string();
    let title_without_series = entry
        .title_without_series
        .as_deref()
        .map(str::to_string)
        .unwrap_or_else(|| title.clone());
    let ratings_count: u64 = ctx.number(&entry.ratings_count, "ratings_count")?;
    let ratings_sum: Option<u64> = ctx.optional_number(&entry.ratings_sum, "ratings_sum")?;

    // Parsed as published, not recomputed
    let published_average: f64 = ctx.number(&entry.average_rating, "average_rating")?;
    let average_rating = (ratings_count > 0).then_some(published_average);

    let author_ids = entry
        .authors
        .iter()
        .flat_map(|list| list.author.iter())
        .map(|author| ctx.number::<u64>(&author.id, "authors.author.id"))
        .collect::<Result<BTreeSet<u64>>>()?;

    Ok(WorkRecord {
        title,
        ratings_sum,
        ratings_count,
        average_rating,
        detail: WorkDetail::Author {
            book_id,
            author_ids,
            title_without_series,
        },
    })
}

/// Normalize every entry of every page, in page order
pub fn normalize(pages: &[RawPage], kind: EntityKind) -> Result<Vec<WorkRecord>> {
    let records = pages
        .iter()
        .flat_map(|page| page.entries(kind))
        .enumerate()
        .map(|(index, value)| CatalogEntry::from_value(kind, index, value)?.normalize(index))
        .collect::<Result<Vec<_>>>()?;

    debug!(kind = %kind, pages = pages.len(), records = records.len(), "Normalized listing");
    Ok(records)
}

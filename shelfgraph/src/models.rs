//! Data models shared by the pipeline stages
//!
//! Records flow forward through the stages by value; every stage returns a
//! new sequence rather than mutating its input.

use std::collections::BTreeSet;
use std::fmt;

/// Kind of catalog entity being queried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// An author's bibliography, ordered by the catalog's popularity ranking
    Author,
    /// A themed collection (series), ordered by series position
    Collection,
}

impl EntityKind {
    /// Works requested per page for this kind's listing endpoint
    pub fn page_size(self) -> u32 {
        match self {
            EntityKind::Author => 30,
            EntityKind::Collection => 100,
        }
    }

    /// Catalog endpoint listing this kind's works
    pub fn endpoint(self) -> &'static str {
        match self {
            EntityKind::Author => "author/list",
            EntityKind::Collection => "series/show",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Author => write!(f, "author"),
            EntityKind::Collection => write!(f, "series"),
        }
    }
}

/// Typed identifier of a catalog entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityReference {
    pub kind: EntityKind,
    pub id: u64,
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Ordering applied before the cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Order returned by the catalog (popularity or series order)
    #[default]
    PopularityOrder,
    /// Average rating, highest first; ties keep catalog order
    RatingDescending,
}

/// Maximum number of ranked works to render
///
/// Negative values mean unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoff(pub i64);

impl Cutoff {
    pub const UNLIMITED: Cutoff = Cutoff(-1);

    /// Number of records to keep, or `None` for all of them
    pub fn limit(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl Default for Cutoff {
    fn default() -> Self {
        Cutoff::UNLIMITED
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit() {
            Some(n) => write!(f, "{}", n),
            None => write!(f, "unlimited"),
        }
    }
}

/// One pipeline invocation
///
/// Only `cutoff` changes between visualization iterations, via [`with_cutoff`](Self::with_cutoff).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineRequest {
    pub entity: EntityReference,
    pub cutoff: Cutoff,
    pub sort_mode: SortMode,
    /// Author mode only: works need strictly more ratings than this
    pub min_ratings_count: i64,
}

impl PipelineRequest {
    pub fn new(entity: EntityReference) -> Self {
        Self {
            entity,
            cutoff: Cutoff::UNLIMITED,
            sort_mode: SortMode::default(),
            min_ratings_count: 1,
        }
    }

    pub fn with_cutoff(self, cutoff: Cutoff) -> Self {
        Self { cutoff, ..self }
    }
}

/// Entity-kind-specific part of a work record
#[derive(Debug, Clone, PartialEq)]
pub enum WorkDetail {
    Collection {
        /// Position within the series as listed (may be "1.5", "1-3", or absent)
        series_position: Option<String>,
    },
    Author {
        /// Catalog id of the listed edition
        book_id: u64,
        /// Credited authors of the work
        author_ids: BTreeSet<u64>,
        /// Title without the "(Series, #n)" suffix
        title_without_series: String,
    },
}

/// One work, flattened from the catalog payload
#[derive(Debug, Clone, PartialEq)]
pub struct WorkRecord {
    pub title: String,
    /// Sum of all ratings; author listings do not always expose it
    pub ratings_sum: Option<u64>,
    pub ratings_count: u64,
    /// `None` when `ratings_count == 0`
    pub average_rating: Option<f64>,
    pub detail: WorkDetail,
}

impl WorkRecord {
    /// Label used on the chart's category axis
    pub fn label(&self) -> &str {
        match &self.detail {
            WorkDetail::Collection { .. } => &self.title,
            WorkDetail::Author {
                title_without_series,
                ..
            } => title_without_series,
        }
    }
}

/// Ranked, truncated records ready for rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedSet {
    records: Vec<WorkRecord>,
}

impl RankedSet {
    /// Wrap records that are already ranked; every record must carry an average rating
    pub(crate) fn from_ranked(records: Vec<WorkRecord>) -> Self {
        debug_assert!(records.iter().all(|r| r.average_rating.is_some()));
        Self { records }
    }

    pub fn records(&self) -> &[WorkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Chart series: category labels and their average ratings
    pub fn series(&self) -> (Vec<String>, Vec<f64>) {
        self.records
            .iter()
            .filter_map(|r| r.average_rating.map(|avg| (r.label().to_string(), avg)))
            .unzip()
    }
}

//! Sort policy and cutoff
//!
//! Every call builds a fresh [`RankedSet`]; the input is never reordered in place.

use crate::models::{Cutoff, RankedSet, SortMode, WorkRecord};
use std::cmp::Ordering;
use tracing::debug;

/// Rank `records` under `sort_mode` and truncate to `cutoff`
///
/// Records without an average rating (no ratings) are excluded first.
pub fn rank(records: &[WorkRecord], sort_mode: SortMode, cutoff: Cutoff) -> RankedSet {
    let mut ranked: Vec<WorkRecord> = records
        .iter()
        .filter(|r| r.average_rating.is_some())
        .cloned()
        .collect();

    let unrated = records.len() - ranked.len();
    if unrated > 0 {
        debug!(unrated, "Excluded works without ratings");
    }

    if sort_mode == SortMode::RatingDescending {
        // sort_by is stable: equal ratings keep catalog order
        ranked.sort_by(|a, b| descending(a.average_rating, b.average_rating));
    }

    if let Some(limit) = cutoff.limit() {
        ranked.truncate(limit);
    }

    RankedSet::from_ranked(ranked)
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        _ => Ordering::Equal,
    }
}

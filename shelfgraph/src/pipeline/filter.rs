//! Entity-kind-specific inclusion rules
//!
//! Order-preserving; never reorders.

use crate::models::{EntityKind, PipelineRequest, WorkDetail, WorkRecord};
use tracing::debug;

/// Keep the records that belong on the entity's chart
///
/// Series: everything. Author: works credited to the author with strictly
/// more than `min_ratings_count` ratings.
pub fn filter(records: Vec<WorkRecord>, request: &PipelineRequest) -> Vec<WorkRecord> {
    match request.entity.kind {
        EntityKind::Collection => records,
        EntityKind::Author => {
            let before = records.len();
            let kept: Vec<WorkRecord> = records
                .into_iter()
                .filter(|record| keep_author_work(record, request))
                .collect();
            debug!(
                entity = %request.entity,
                min_ratings_count = request.min_ratings_count,
                kept = kept.len(),
                dropped = before - kept.len(),
                "Filtered author works"
            );
            kept
        }
    }
}

fn keep_author_work(record: &WorkRecord, request: &PipelineRequest) -> bool {
    let credited = match &record.detail {
        WorkDetail::Author {
            book_id,
            author_ids,
            ..
        } => {
            let credited = author_ids.contains(&request.entity.id);
            if !credited {
                debug!(book_id, title = %record.title, "Not a credited author, skipping");
            }
            credited
        }
        WorkDetail::Collection { .. } => false,
    };

    // Strict: a work with exactly the minimum is excluded
    let count = i64::try_from(record.ratings_count).unwrap_or(i64::MAX);
    credited && count > request.min_ratings_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityReference;
    use std::collections::BTreeSet;

    const AUTHOR_ID: u64 = 2565;

    fn author_request(min_ratings_count: i64) -> PipelineRequest {
        PipelineRequest {
            min_ratings_count,
            ..PipelineRequest::new(EntityReference {
                kind: EntityKind::Author,
                id: AUTHOR_ID,
            })
        }
    }

    fn book(title: &str, ratings_count: u64, authors: &[u64]) -> WorkRecord {
        WorkRecord {
            title: title.to_string(),
            ratings_sum: None,
            ratings_count,
            average_rating: Some(4.0),
            detail: WorkDetail::Author {
                book_id: 1,
                author_ids: authors.iter().copied().collect::<BTreeSet<_>>(),
                title_without_series: title.to_string(),
            },
        }
    }

    fn titles(records: &[WorkRecord]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_min_ratings_is_strict() {
        let records = vec![book("one", 1, &[AUTHOR_ID]), book("two", 2, &[AUTHOR_ID])];
        let kept = filter(records, &author_request(1));
        assert_eq!(titles(&kept), vec!["two"]);
    }

    #[test]
    fn test_uncredited_works_dropped() {
        let records = vec![
            book("translated", 500, &[999]),
            book("own", 500, &[AUTHOR_ID]),
            book("co-written", 500, &[AUTHOR_ID, 999]),
        ];
        let kept = filter(records, &author_request(1));
        assert_eq!(titles(&kept), vec!["own", "co-written"]);
    }

    #[test]
    fn test_order_preserved() {
        let records = vec![
            book("c", 10, &[AUTHOR_ID]),
            book("a", 10, &[AUTHOR_ID]),
            book("b", 10, &[AUTHOR_ID]),
        ];
        let kept = filter(records, &author_request(1));
        assert_eq!(titles(&kept), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_negative_minimum_keeps_unrated() {
        let records = vec![book("unrated", 0, &[AUTHOR_ID])];
        assert_eq!(filter(records, &author_request(-1)).len(), 1);
    }

    #[test]
    fn test_collection_is_identity() {
        let request = PipelineRequest::new(EntityReference {
            kind: EntityKind::Collection,
            id: 1,
        });
        let records = vec![
            WorkRecord {
                title: "x".to_string(),
                ratings_sum: Some(0),
                ratings_count: 0,
                average_rating: None,
                detail: WorkDetail::Collection {
                    series_position: None,
                },
            };
            3
        ];
        assert_eq!(filter(records.clone(), &request), records);
    }
}

//! Pipeline integration tests: retrieval → normalization → filter → ranking
//! against an in-memory catalog

mod helpers;

use helpers::{author_book, author_page, series_page, series_work, FakeCatalog};
use shelfgraph::models::WorkDetail;
use shelfgraph::pipeline::{fetch_all, load_records, normalize, rank};
use shelfgraph::{Cutoff, EntityKind, EntityReference, Error, PipelineRequest, SortMode};
use std::time::Duration;

const SERIES: &str = "series/show";
const AUTHOR: &str = "author/list";

fn series_ref(id: u64) -> EntityReference {
    EntityReference {
        kind: EntityKind::Collection,
        id,
    }
}

fn author_ref(id: u64) -> EntityReference {
    EntityReference {
        kind: EntityKind::Author,
        id,
    }
}

#[tokio::test]
async fn test_zero_rated_work_is_fetched_but_not_ranked() {
    let catalog = FakeCatalog::new().with_page(
        SERIES,
        7,
        1,
        series_page(
            3,
            vec![
                series_work("1", "Casino Royale", 40, 10),
                series_work("2", "Unreleased", 0, 0),
                series_work("3", "Moonraker", 35, 10),
            ],
        ),
    );

    let request = PipelineRequest::new(series_ref(7));
    let records = load_records(&catalog, &request, 1).await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].average_rating, None);

    let ranked = rank(&records, SortMode::PopularityOrder, Cutoff::UNLIMITED);
    let (labels, ratings) = ranked.series();
    assert_eq!(labels, vec!["Casino Royale", "Moonraker"]);
    assert_eq!(ratings, vec![4.0, 3.5]);
    assert_eq!(catalog.request_count(), 1);
}

#[tokio::test]
async fn test_zero_total_fetches_single_page() {
    let catalog = FakeCatalog::new().with_page(SERIES, 7, 1, series_page(0, vec![]));

    let pages = fetch_all(&catalog, &series_ref(7), 100, 1).await.unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(catalog.requests(), vec![(SERIES.to_string(), 7, 1)]);

    let records = normalize(&pages, EntityKind::Collection).unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_trailing_empty_page_is_tolerated() {
    // total 3 with page size 2 requests pages 1 and 2; page 1 already holds everything
    let catalog = FakeCatalog::new()
        .with_page(
            SERIES,
            7,
            1,
            series_page(
                3,
                vec![
                    series_work("1", "A", 4, 1),
                    series_work("2", "B", 3, 1),
                    series_work("3", "C", 5, 1),
                ],
            ),
        )
        .with_page(SERIES, 7, 2, series_page(3, vec![]));

    let pages = fetch_all(&catalog, &series_ref(7), 2, 1).await.unwrap();
    assert_eq!(pages.len(), 2);

    let records = normalize(&pages, EntityKind::Collection).unwrap();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_pages_requested_up_to_ceiling() {
    let mut catalog = FakeCatalog::new();
    for page in 1..=3 {
        catalog = catalog.with_page(
            SERIES,
            7,
            page,
            series_page(5, vec![series_work(&page.to_string(), &format!("Book {}", page), 4, 1)]),
        );
    }

    let pages = fetch_all(&catalog, &series_ref(7), 2, 1).await.unwrap();
    assert_eq!(pages.len(), 3);

    let pages_requested: Vec<u64> = catalog.requests().into_iter().map(|(_, _, p)| p).collect();
    assert_eq!(pages_requested, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_failed_page_fails_whole_retrieval() {
    let catalog = FakeCatalog::new()
        .with_page(SERIES, 7, 1, series_page(6, vec![series_work("1", "A", 4, 1)]))
        .with_page(SERIES, 7, 2, series_page(6, vec![series_work("2", "B", 4, 1)]))
        .with_failure(SERIES, 7, 3);

    let err = fetch_all(&catalog, &series_ref(7), 2, 2).await.unwrap_err();
    assert!(matches!(err, Error::RemoteService(_)));
}

#[tokio::test]
async fn test_concurrent_fetch_preserves_page_order() {
    // Page 2 answers last, yet must stay ahead of pages 3 and 4
    let mut catalog = FakeCatalog::new();
    for page in 1..=4 {
        catalog = catalog.with_page(
            SERIES,
            7,
            page,
            series_page(8, vec![series_work(&page.to_string(), &format!("Book {}", page), 4, 1)]),
        );
    }
    let catalog = catalog.with_delay(SERIES, 7, 2, Duration::from_millis(50));

    let pages = fetch_all(&catalog, &series_ref(7), 2, 3).await.unwrap();
    let records = normalize(&pages, EntityKind::Collection).unwrap();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Book 1", "Book 2", "Book 3", "Book 4"]);
}

#[tokio::test]
async fn test_author_listing_filtered_by_credit_and_ratings() {
    let catalog = FakeCatalog::new().with_page(
        AUTHOR,
        2565,
        1,
        author_page(
            4,
            vec![
                author_book(1, "Casino Royale", "3.73", 2, &[2565]),
                author_book(2, "Barely Rated", "5.00", 1, &[2565]),
                author_book(3, "Anthology", "3.90", 500, &[9999]),
                author_book(4, "Co-written", "4.10", 40, &[9999, 2565]),
            ],
        ),
    );

    let request = PipelineRequest::new(author_ref(2565));
    let records = load_records(&catalog, &request, 1).await.unwrap();

    let labels: Vec<&str> = records.iter().map(|r| r.label()).collect();
    assert_eq!(labels, vec!["Casino Royale", "Co-written"]);
    assert!(matches!(
        records[0].detail,
        WorkDetail::Author { book_id: 1, .. }
    ));
    assert_eq!(records[0].average_rating, Some(3.73));
}

#[tokio::test]
async fn test_author_listing_spans_pages_in_popularity_order() {
    // 31 books at 30 per page: pages 1 and 2 only
    let book = |n: u64| author_book(n, &format!("Book {}", n), "4.00", 10 + n, &[2565]);
    let catalog = FakeCatalog::new()
        .with_page(AUTHOR, 2565, 1, author_page(31, (1..=30).map(book).collect()))
        .with_page(AUTHOR, 2565, 2, author_page(31, vec![book(31)]));

    let records = load_records(&catalog, &PipelineRequest::new(author_ref(2565)), 2)
        .await
        .unwrap();

    assert_eq!(
        catalog.requests(),
        vec![(AUTHOR.to_string(), 2565, 1), (AUTHOR.to_string(), 2565, 2)]
    );
    let labels: Vec<&str> = records.iter().map(|r| r.label()).collect();
    let expected: Vec<String> = (1..=31).map(|n| format!("Book {}", n)).collect();
    assert_eq!(labels, expected);

    let ranked = rank(&records, SortMode::PopularityOrder, Cutoff(31));
    assert_eq!(ranked.series().0.last().map(String::as_str), Some("Book 31"));
}

#[tokio::test]
async fn test_author_single_book_listing() {
    let catalog = FakeCatalog::new().with_page(
        AUTHOR,
        42,
        1,
        author_page(1, vec![author_book(10, "Only Book", "4.20", 12, &[42])]),
    );

    let records = load_records(&catalog, &PipelineRequest::new(author_ref(42)), 1)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].label(), "Only Book");
}

#[tokio::test]
async fn test_rating_sort_is_stable_then_cut() {
    let catalog = FakeCatalog::new().with_page(
        SERIES,
        7,
        1,
        series_page(
            3,
            vec![
                series_work("1", "A", 30, 10),
                series_work("2", "B", 45, 10),
                series_work("3", "C", 45, 10),
            ],
        ),
    );

    let records = load_records(&catalog, &PipelineRequest::new(series_ref(7)), 1)
        .await
        .unwrap();

    let ranked = rank(&records, SortMode::RatingDescending, Cutoff::UNLIMITED);
    let (labels, _) = ranked.series();
    assert_eq!(labels, vec!["B", "C", "A"]);

    let top = rank(&records, SortMode::RatingDescending, Cutoff(1));
    assert_eq!(top.series().0, vec!["B"]);
}

#[tokio::test]
async fn test_malformed_entry_aborts_load() {
    let mut broken = series_work("1", "A", 4, 1);
    broken["work"]
        .as_object_mut()
        .unwrap()
        .remove("ratings_count");
    let catalog = FakeCatalog::new().with_page(SERIES, 7, 1, series_page(1, vec![broken]));

    let err = load_records(&catalog, &PipelineRequest::new(series_ref(7)), 1)
        .await
        .unwrap_err();
    match err {
        Error::MalformedRecord(message) => assert!(message.contains("ratings_count")),
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
}

//! Listing payloads shaped like converted catalog XML

use serde_json::{json, Value};
use shelfgraph::services::RawPage;

/// One `series_work` entry
pub fn series_work(position: &str, title: &str, ratings_sum: u64, ratings_count: u64) -> Value {
    json!({
        "id": "1",
        "user_position": position,
        "work": {
            "id": "100",
            "ratings_sum": ratings_sum.to_string(),
            "ratings_count": ratings_count.to_string(),
            "best_book": {
                "id": {"@type": "integer", "#text": "200"},
                "title": title,
                "author": {"id": "2565", "name": "Ian Fleming"}
            }
        }
    })
}

/// A series listing page holding `works`
pub fn series_page(total: u64, works: Vec<Value>) -> RawPage {
    let series_works = match works.len() {
        0 => Value::Null,
        1 => json!({"series_work": works[0].clone()}),
        _ => json!({"series_work": works}),
    };
    RawPage::new(json!({
        "series": {
            "id": "49397",
            "title": "James Bond - Extended Series",
            "series_works_count": total.to_string(),
            "series_works": series_works
        }
    }))
}

/// One `book` entry of an author listing
pub fn author_book(
    book_id: u64,
    title: &str,
    average_rating: &str,
    ratings_count: u64,
    author_ids: &[u64],
) -> Value {
    let authors: Vec<Value> = author_ids
        .iter()
        .map(|id| json!({"id": id.to_string(), "name": format!("Author {}", id)}))
        .collect();
    let authors = match authors.len() {
        1 => authors[0].clone(),
        _ => Value::Array(authors),
    };
    json!({
        "id": {"@type": "integer", "#text": book_id.to_string()},
        "title": format!("{} (Series, #1)", title),
        "title_without_series": title,
        "average_rating": average_rating,
        "ratings_count": ratings_count.to_string(),
        "authors": {"author": authors}
    })
}

/// An author listing page holding `books`
pub fn author_page(total: u64, books: Vec<Value>) -> RawPage {
    let book = match books.len() {
        0 => Value::Null,
        1 => books[0].clone(),
        _ => Value::Array(books),
    };
    RawPage::new(json!({
        "author": {
            "id": "2565",
            "name": "Ian Fleming",
            "books": {"@start": "1", "@end": "30", "@total": total.to_string(), "book": book}
        }
    }))
}

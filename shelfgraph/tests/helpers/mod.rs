//! Test Helper Utilities
//!
//! Shared utilities for testing shelfgraph

#![allow(dead_code, unused_imports)]

pub mod fake_catalog;
pub mod fixtures;
pub mod recording_renderer;

// Re-export commonly used items
pub use fake_catalog::FakeCatalog;
pub use fixtures::{author_book, author_page, series_page, series_work};
pub use recording_renderer::{Render, RecordingRenderer};

//! shelfgraph library interface
//!
//! Catalog URL → paginated fetch → flat work records → filter → rank →
//! scatter chart, with an interactive re-cutoff loop. The binary wires the
//! production boundaries; tests inject their own.

pub mod driver;
pub mod extract;
pub mod input;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod services;
pub mod visualize;

pub use driver::{BatchSummary, Driver, DriverOptions};
pub use models::{Cutoff, EntityKind, EntityReference, PipelineRequest, RankedSet, SortMode, WorkRecord};
pub use shelfgraph_common::{Error, Result};

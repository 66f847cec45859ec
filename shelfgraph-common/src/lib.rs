//! # shelfgraph Common Library
//!
//! Shared code for the shelfgraph workspace:
//! - Error taxonomy (`Error`, `Result`)
//! - TOML configuration loading and credential resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};

//! URL handling module for Script-Census
//!
//! This module builds search URLs from user queries and turns the raw
//! `href`/`src` attribute values found on pages into absolute URLs.

mod resolve;
mod search;

// Re-export main functions
pub use resolve::resolve_link;
pub use search::{build_search_url, unwrap_redirect};

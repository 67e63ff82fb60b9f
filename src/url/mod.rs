//! URL handling module for Doc-Harvest
//!
//! This module provides the scope predicates that decide which URLs belong to
//! a crawl, and link normalization (resolution plus fragment stripping).
//! Every function here is pure and never fails on malformed input.

mod normalize;
mod scope;

pub use normalize::{normalize_link, strip_fragment};
pub use scope::{authority, same_host, under_base_path, Scope};

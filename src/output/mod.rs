//! Output module for crawl summaries
//!
//! This module handles:
//! - Accumulating crawl counters and download records
//! - Rendering the end-of-run summary for the console

mod summary;

pub use summary::{format_summary, print_summary, CrawlSummary, PREVIEW_LIMIT};

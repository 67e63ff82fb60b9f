//! Crawler module for page fetching and document harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and link extraction
//! - Document detection and streamed downloads
//! - Frontier management and pacing
//! - Overall crawl coordination

mod coordinator;
mod detector;
mod downloader;
mod fetcher;
mod parser;
mod retry;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator};
pub use detector::DocumentDetector;
pub use downloader::{
    create_unique_file, disambiguated_name, filename_from_url, sanitize_filename, DownloadRecord,
    Downloader,
};
pub use fetcher::{build_http_client, FetchResult, HttpClient};
pub use parser::{extract_links, parse_html, ParsedPage};
pub use retry::RetryPolicy;
pub use scheduler::{CrawlTarget, Scheduler};

//! End-of-run crawl summary
//!
//! Counters are accumulated by the coordinator while the crawl runs and the
//! summary is finalized once the frontier empties.

use crate::crawler::DownloadRecord;
use chrono::{DateTime, Utc};
use url::Url;

/// Maximum number of document URLs listed in the preview
pub const PREVIEW_LIMIT: usize = 10;

/// Aggregate results of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Pages that passed scope and robots checks and were fetched
    pub pages_visited: usize,

    /// Links extracted across all fetched pages, counted per page
    pub links_checked: usize,

    /// Distinct document URLs detected
    pub documents_found: usize,

    /// Documents saved successfully
    pub documents_downloaded: usize,

    /// Page fetches that failed after retries
    pub page_failures: usize,

    /// Document downloads that failed
    pub download_failures: usize,

    /// Pages and document links skipped because robots.txt disallows them
    pub policy_denials: usize,

    /// The first document URLs in lexical order
    pub preview: Vec<Url>,

    /// Every successful download
    pub downloads: Vec<DownloadRecord>,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for CrawlSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlSummary {
    /// Starts an empty summary timestamped now
    pub fn new() -> Self {
        Self {
            pages_visited: 0,
            links_checked: 0,
            documents_found: 0,
            documents_downloaded: 0,
            page_failures: 0,
            download_failures: 0,
            policy_denials: 0,
            preview: Vec::new(),
            downloads: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Records a successful download
    pub fn record_download(&mut self, record: DownloadRecord) {
        self.documents_downloaded += 1;
        self.downloads.push(record);
    }

    /// Freezes the summary with the full set of detected documents
    pub fn finish<'a>(&mut self, documents: impl IntoIterator<Item = &'a Url>) {
        let mut documents: Vec<&Url> = documents.into_iter().collect();
        documents.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        self.documents_found = documents.len();
        self.preview = documents
            .into_iter()
            .take(PREVIEW_LIMIT)
            .cloned()
            .collect();
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration of the run, once finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }

    /// Total bytes written across all downloads
    pub fn bytes_written(&self) -> u64 {
        self.downloads.iter().map(|d| d.bytes_written).sum()
    }
}

/// Formats a summary for the console
///
/// The four headline counters and the preview come first; failure counters
/// follow only when non-zero.
pub fn format_summary(summary: &CrawlSummary) -> String {
    let mut out = String::new();

    out.push_str("=== Summary ===\n");
    out.push_str(&format!("Pages visited: {}\n", summary.pages_visited));
    out.push_str(&format!("Links checked: {}\n", summary.links_checked));
    out.push_str(&format!("Documents found: {}\n", summary.documents_found));
    out.push_str(&format!("Downloaded: {}\n", summary.documents_downloaded));

    if !summary.preview.is_empty() {
        out.push_str("First documents:\n");
        for (i, url) in summary.preview.iter().enumerate() {
            out.push_str(&format!("  {:>2}. {}\n", i + 1, url));
        }
    }

    if summary.page_failures > 0 {
        out.push_str(&format!("Page failures: {}\n", summary.page_failures));
    }
    if summary.download_failures > 0 {
        out.push_str(&format!("Download failures: {}\n", summary.download_failures));
    }
    if summary.policy_denials > 0 {
        out.push_str(&format!("Disallowed by robots.txt: {}\n", summary.policy_denials));
    }
    if let Some(duration) = summary.duration() {
        out.push_str(&format!(
            "Elapsed: {:.1}s ({} bytes written)\n",
            duration.num_milliseconds() as f64 / 1000.0,
            summary.bytes_written()
        ));
    }

    out
}

/// Prints a summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    print!("\n{}", format_summary(summary));
}

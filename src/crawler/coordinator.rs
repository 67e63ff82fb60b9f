//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Loading the site's exclusion policy once, before the first page
//! - Gating every candidate by scope and robots.txt before any request
//! - Fetching pages, extracting links and classifying them
//! - Downloading each detected document exactly once
//! - Pacing network operations by the enforced delay

use crate::config::Config;
use crate::crawler::detector::DocumentDetector;
use crate::crawler::downloader::Downloader;
use crate::crawler::parser::parse_html;
use crate::crawler::scheduler::{CrawlTarget, Scheduler};
use crate::crawler::{build_http_client, HttpClient};
use crate::output::CrawlSummary;
use crate::robots::{load_policy, ExclusionPolicy};
use crate::state::DocumentState;
use crate::url::{strip_fragment, Scope};
use crate::{ConfigError, HarvestError};
use std::time::Duration;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    client: HttpClient,
    scope: Scope,
    scheduler: Scheduler,
    detector: DocumentDetector,
    downloader: Downloader,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// The HTTP client is built here and lives for the whole run.
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawl configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Bad start URL or HTTP client construction failed
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config)?;
        Self::with_client(config, client)
    }

    /// Creates a coordinator around an existing client
    pub fn with_client(config: Config, client: HttpClient) -> Result<Self, HarvestError> {
        let mut start = Url::parse(&config.crawler.start_url)?;
        strip_fragment(&mut start);

        let delay = Duration::try_from_secs_f64(config.crawler.delay_secs).map_err(|e| {
            ConfigError::Validation(format!(
                "delay_secs {} is not a usable duration: {}",
                config.crawler.delay_secs, e
            ))
        })?;

        let scope = Scope::new(start.clone(), config.crawler.same_path_only);
        let scheduler = Scheduler::new(start, config.crawler.max_depth, delay);
        let detector = DocumentDetector::new(&config.document);
        let downloader = Downloader::new(&config.output.directory, &config.document.extension);

        Ok(Self {
            config,
            client,
            scope,
            scheduler,
            detector,
            downloader,
        })
    }

    /// Runs the crawl until the frontier is empty
    ///
    /// Per-URL failures are logged and counted; they never end the run.
    pub async fn run(&mut self) -> Result<CrawlSummary, HarvestError> {
        let mut summary = CrawlSummary::new();

        let policy = load_policy(
            &self.client,
            self.scope.base(),
            &self.config.user_agent.crawler_name,
            self.config.robots.fail_open,
        )
        .await;
        self.scheduler.raise_delay(policy.delay());

        tracing::info!(
            "Crawling {} (max depth {}, {}, enforced delay {:?})",
            self.scope.base(),
            self.config.crawler.max_depth,
            if self.scope.same_path_only() {
                "same path only"
            } else {
                "whole site"
            },
            self.scheduler.delay()
        );

        while let Some(target) = self.scheduler.next_target() {
            self.process_page(&target, &policy, &mut summary).await?;
        }

        summary.finish(self.scheduler.documents());

        tracing::info!(
            "Crawl completed: {} URLs dequeued, {} pages visited, {} documents found, {} downloaded",
            self.scheduler.visited_count(),
            summary.pages_visited,
            summary.documents_found,
            summary.documents_downloaded
        );

        Ok(summary)
    }

    /// Visits one dequeued page and handles every link on it
    async fn process_page(
        &mut self,
        target: &CrawlTarget,
        policy: &ExclusionPolicy,
        summary: &mut CrawlSummary,
    ) -> Result<(), HarvestError> {
        let url = &target.url;

        if !self.scope.contains(url) {
            tracing::debug!("Out of scope: {}", url);
            return Ok(());
        }
        if !policy.is_allowed(url.as_str()) {
            tracing::info!("Skipping page disallowed by robots.txt: {}", url);
            summary.policy_denials += 1;
            return Ok(());
        }

        tracing::info!(
            "Visiting ({}) {} [{} queued]",
            target.depth,
            url,
            self.scheduler.frontier_size()
        );
        summary.pages_visited += 1;
        let fetched = self.client.fetch_page(url).await;
        self.scheduler.pause().await;

        let html = match fetched {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to fetch page {}: {}", url, e);
                summary.page_failures += 1;
                return Ok(());
            }
        };

        let parsed = parse_html(&html, url);
        tracing::debug!(
            "{} links on {} ({})",
            parsed.links.len(),
            url,
            parsed.title.as_deref().unwrap_or("untitled")
        );

        for link in parsed.links {
            summary.links_checked += 1;
            self.handle_link(link, target.depth, policy, summary).await?;
        }

        Ok(())
    }

    /// Classifies one extracted link and downloads or enqueues it
    async fn handle_link(
        &mut self,
        link: Url,
        depth: u32,
        policy: &ExclusionPolicy,
        summary: &mut CrawlSummary,
    ) -> Result<(), HarvestError> {
        if !self.scope.contains(&link) {
            tracing::trace!("Out of scope: {}", link);
            return Ok(());
        }

        let allowed = policy.is_allowed(link.as_str());
        // A disallowed or already visited URL is never probed
        let is_document = if !allowed || self.scheduler.is_visited(&link) {
            self.detector.is_document_path(&link)
        } else {
            self.detector.is_document(&self.client, &link).await
        };

        if !is_document {
            if self.scheduler.can_expand(depth) && self.scheduler.enqueue(link.clone(), depth + 1) {
                tracing::trace!("Queued ({}) {}", depth + 1, link);
            }
            return Ok(());
        }

        if !allowed {
            tracing::info!("Skipping document disallowed by robots.txt: {}", link);
            summary.policy_denials += 1;
            return Ok(());
        }

        if !self.scheduler.mark_detected(&link) {
            return Ok(());
        }

        let outcome = match self.downloader.download(&self.client, &link).await {
            Ok(record) => {
                tracing::info!(
                    "Saved {} ({} bytes)",
                    record.local_path.display(),
                    record.bytes_written
                );
                summary.record_download(record);
                DocumentState::Downloaded
            }
            Err(e) => {
                tracing::warn!("Download failed for {}: {}", link, e);
                summary.download_failures += 1;
                DocumentState::DownloadFailed
            }
        };
        self.scheduler.record_download(&link, outcome)?;
        self.scheduler.pause().await;

        Ok(())
    }
}

/// Runs the main crawl operation
///
/// Builds a [`Coordinator`] from the configuration and runs it to
/// completion.
///
/// # Example
///
/// ```no_run
/// use doc_harvest::config::Config;
/// use doc_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.crawler.max_depth = 1;
/// let summary = run_crawl(config).await?;
/// println!("{} documents downloaded", summary.documents_downloaded);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlSummary, HarvestError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}

//! Robots.txt handling module
//!
//! The site's robots.txt is fetched once per crawl, before the first page,
//! and turned into an immutable [`ExclusionPolicy`]. Loading never fails the
//! crawl: an unreachable or unreadable file falls back to a permissive
//! policy (or a deny-all one when the crawl is configured to fail closed).

mod parser;

pub use parser::{crawl_delay, ExclusionPolicy};

use crate::crawler::HttpClient;
use crate::HarvestError;
use url::Url;

/// Derives the robots.txt location at the root of `base_url`'s site
///
/// # Examples
///
/// ```
/// use url::Url;
/// use doc_harvest::robots::robots_url;
///
/// let base = Url::parse("https://example.com:8080/a/b/?q=1").unwrap();
/// assert_eq!(robots_url(&base).unwrap().as_str(), "https://example.com:8080/robots.txt");
/// ```
pub fn robots_url(base_url: &Url) -> Option<Url> {
    base_url.host_str()?;
    base_url.join("/robots.txt").ok()
}

/// Fetches and parses the exclusion policy for the site hosting `base_url`
///
/// # Arguments
///
/// * `client` - The crawl's HTTP client
/// * `base_url` - Any URL on the site, usually the start URL
/// * `agent` - The crawler's product token
/// * `fail_open` - Policy to use when robots.txt cannot be loaded
///
/// # Returns
///
/// The loaded policy. A missing file (HTTP 404 and the like) means no rules
/// and always allows everything; any other failure yields
/// [`ExclusionPolicy::allow_all`] when `fail_open` is set and
/// [`ExclusionPolicy::deny_all`] otherwise.
pub async fn load_policy(
    client: &HttpClient,
    base_url: &Url,
    agent: &str,
    fail_open: bool,
) -> ExclusionPolicy {
    let fallback = || {
        if fail_open {
            ExclusionPolicy::allow_all()
        } else {
            ExclusionPolicy::deny_all()
        }
    };

    let Some(url) = robots_url(base_url) else {
        tracing::warn!("Cannot derive robots.txt location from {}", base_url);
        return fallback();
    };

    tracing::debug!("Fetching robots.txt from {}", url);
    match client.fetch_page(&url).await {
        Ok(content) => {
            let policy = ExclusionPolicy::from_content(&content, agent);
            tracing::info!(
                "Loaded robots.txt from {} (crawl delay {:?})",
                url,
                policy.delay()
            );
            policy
        }
        Err(HarvestError::Status { status, .. }) if is_missing(status) => {
            tracing::info!("No robots.txt at {} (HTTP {}), allowing all", url, status);
            ExclusionPolicy::allow_all()
        }
        Err(e) => {
            tracing::warn!(
                "Failed to load robots.txt from {}: {} (falling back to {})",
                url,
                e,
                if fail_open { "allow all" } else { "deny all" }
            );
            fallback()
        }
    }
}

/// Client errors other than 401/403/429 mean the site publishes no rules
fn is_missing(status: u16) -> bool {
    (400..500).contains(&status) && !matches!(status, 401 | 403 | 429)
}

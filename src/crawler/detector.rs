//! Target document detection
//!
//! A URL is a document when its path ends with the target extension, or,
//! failing that, when a HEAD probe reports the target Content-Type. Probe
//! outcomes are cached for the run so each URL is probed at most once.

use crate::config::DocumentConfig;
use crate::crawler::HttpClient;
use std::collections::HashMap;
use url::Url;

/// Classifies candidate URLs as target documents
#[derive(Debug, Clone)]
pub struct DocumentDetector {
    /// Lowercase extension including the dot (e.g. `.pdf`)
    extension: String,
    /// Lowercase media type (e.g. `application/pdf`)
    content_type: String,
    probe_cache: HashMap<Url, bool>,
}

impl DocumentDetector {
    /// Creates a detector for the configured document format
    pub fn new(config: &DocumentConfig) -> Self {
        Self {
            extension: config.extension.to_lowercase(),
            content_type: config.content_type.trim().to_lowercase(),
            probe_cache: HashMap::new(),
        }
    }

    /// The extension matched by [`DocumentDetector::is_document_path`]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Checks whether the URL path ends with the target extension (case-insensitive)
    pub fn is_document_path(&self, url: &Url) -> bool {
        url.path().to_lowercase().ends_with(&self.extension)
    }

    /// Checks whether a Content-Type header value names the target format
    pub fn matches_content_type(&self, header: &str) -> bool {
        header.to_lowercase().contains(&self.content_type)
    }

    /// Classifies a URL, probing the server only when the path is inconclusive
    ///
    /// A failed probe counts as "not a document"; it never stops traversal.
    pub async fn is_document(&mut self, client: &HttpClient, url: &Url) -> bool {
        if self.is_document_path(url) {
            return true;
        }
        if let Some(&cached) = self.probe_cache.get(url) {
            return cached;
        }

        let is_document = match client.probe_content_type(url).await {
            Ok(Some(content_type)) => self.matches_content_type(&content_type),
            Ok(None) => false,
            Err(e) => {
                tracing::debug!("Probe failed for {}: {}", url, e);
                false
            }
        };

        tracing::trace!("Probed {}: document={}", url, is_document);
        self.probe_cache.insert(url.clone(), is_document);
        is_document
    }
}

use serde::Deserialize;

/// Start page used when neither the config file nor the CLI names one
pub const DEFAULT_START_URL: &str = "https://www.in.gov/medicaid/providers/provider-references/bulletins-banner-pages-and-reference-modules/ihcp-provider-reference-modules/";

/// Main configuration structure for Doc-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub retry: RetryConfig,
    pub robots: RobotsConfig,
    pub document: DocumentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Page the traversal starts from; also defines the crawl scope
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Maximum depth to crawl from the start page
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Minimum pause between network operations (seconds)
    #[serde(rename = "delay-secs")]
    pub delay_secs: f64,

    /// Restrict traversal to URLs under the start URL's path
    #[serde(rename = "same-path-only")]
    pub same_path_only: bool,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            max_depth: 2,
            delay_secs: 0.5,
            same_path_only: true,
            timeout_secs: 20,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the product token matched against robots.txt groups
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Retry behavior for transient HTTP failures
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per request, including the first one
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (seconds); doubles on each further retry
    #[serde(rename = "backoff-factor")]
    pub backoff_factor: f64,

    /// Upper bound for a single backoff pause (seconds)
    #[serde(rename = "max-backoff-secs")]
    pub max_backoff_secs: f64,

    /// Status codes that are retried
    pub statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_factor: 0.6,
            max_backoff_secs: 120.0,
            statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

/// Robots.txt handling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RobotsConfig {
    /// Treat an unreachable or unreadable robots.txt as "allow everything"
    #[serde(rename = "fail-open")]
    pub fail_open: bool,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self { fail_open: true }
    }
}

/// Target document format
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Path suffix identifying a document, including the leading dot
    pub extension: String,

    /// Content-Type identifying a document when the path does not
    #[serde(rename = "content-type")]
    pub content_type: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            extension: ".pdf".to_string(),
            content_type: "application/pdf".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory downloaded documents are written to
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "ihcp_pdfs".to_string(),
        }
    }
}

//! Robots.txt rule evaluation
//!
//! Allow/disallow matching is delegated to the robotstxt crate; the
//! non-standard `Crawl-delay` directive is parsed here.

use robotstxt::DefaultMatcher;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Rules,
    AllowAll,
    DenyAll,
}

/// The site's exclusion policy as seen by one crawler
///
/// Immutable once built; every gating check in a crawl reads the same value.
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    /// Raw robots.txt content (unused unless mode is `Rules`)
    content: String,
    /// Product token matched against `User-agent` lines
    agent: String,
    mode: Mode,
    delay: Duration,
}

impl ExclusionPolicy {
    /// Creates a policy from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `agent` - The crawler's product token (e.g. `doc-harvest`)
    pub fn from_content(content: &str, agent: &str) -> Self {
        let delay = crawl_delay(content, agent)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(Duration::ZERO);

        Self {
            content: content.to_string(),
            agent: agent.to_string(),
            mode: Mode::Rules,
            delay,
        }
    }

    /// Creates a permissive policy that allows everything with no delay
    ///
    /// This is the default when robots.txt cannot be fetched or parsed.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            agent: String::new(),
            mode: Mode::AllowAll,
            delay: Duration::ZERO,
        }
    }

    /// Creates a policy that denies everything
    ///
    /// Used instead of [`ExclusionPolicy::allow_all`] when the crawl is
    /// configured to fail closed on an unreadable robots.txt.
    pub fn deny_all() -> Self {
        Self {
            content: String::new(),
            agent: String::new(),
            mode: Mode::DenyAll,
            delay: Duration::ZERO,
        }
    }

    /// Checks if a URL may be fetched
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL or path (e.g. `https://example.com/page.html`)
    pub fn is_allowed(&self, url: &str) -> bool {
        match self.mode {
            Mode::AllowAll => true,
            Mode::DenyAll => false,
            Mode::Rules if self.content.trim().is_empty() => true,
            Mode::Rules => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(&self.content, &self.agent, url)
            }
        }
    }

    /// Minimum delay between requests requested by the site
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Extracts the `Crawl-delay` that applies to `user_agent`
///
/// A group is a run of `User-agent` lines followed by its rules; the first
/// group naming the agent wins over the wildcard group.
///
/// # Returns
///
/// * `Some(f64)` - The crawl delay in seconds
/// * `None` - If no applicable crawl delay is specified
pub fn crawl_delay(content: &str, user_agent: &str) -> Option<f64> {
    let normalized_agent = user_agent.to_lowercase();

    let mut group_agents: Vec<String> = Vec::new();
    let mut in_rules = false;
    let mut delay_for_agent: Option<f64> = None;
    let mut delay_for_wildcard: Option<f64> = None;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                // A User-agent line after rules opens a new group
                if in_rules {
                    group_agents.clear();
                    in_rules = false;
                }
                group_agents.push(value.to_lowercase());
            }
            "crawl-delay" => {
                in_rules = true;
                let Ok(delay) = value.parse::<f64>() else {
                    continue;
                };
                if !delay.is_finite() || delay < 0.0 {
                    continue;
                }
                for agent in &group_agents {
                    if agent == "*" {
                        delay_for_wildcard.get_or_insert(delay);
                    } else if !agent.is_empty() && normalized_agent.contains(agent.as_str()) {
                        delay_for_agent.get_or_insert(delay);
                    }
                }
            }
            _ => in_rules = true,
        }
    }

    delay_for_agent.or(delay_for_wildcard)
}

//! Configuration module for Doc-Harvest
//!
//! Every setting has a default, so a configuration file is optional. When one
//! is given it is loaded from TOML and the CLI flags are applied on top.
//!
//! # Example
//!
//! ```no_run
//! use doc_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, CrawlerConfig, DocumentConfig, OutputConfig, RetryConfig, RobotsConfig,
    UserAgentConfig, DEFAULT_START_URL,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;

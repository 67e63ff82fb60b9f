//! Doc-Harvest main entry point
//!
//! This is the command-line interface for the Doc-Harvest document crawler.

use anyhow::Context;
use clap::Parser;
use doc_harvest::config::{load_config_with_hash, validate, Config};
use doc_harvest::crawler::run_crawl;
use doc_harvest::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Doc-Harvest: a polite, scoped document crawler
///
/// Doc-Harvest walks one section of a website breadth-first, respecting
/// robots.txt and a minimum delay between requests, and downloads every
/// PDF (or other configured format) it finds.
#[derive(Parser, Debug)]
#[command(name = "doc-harvest")]
#[command(version)]
#[command(about = "Crawl a site section and download its documents", long_about = None)]
struct Cli {
    /// Optional TOML configuration file (CLI flags take precedence)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start page URL
    #[arg(long, value_name = "URL")]
    start: Option<String>,

    /// Output directory for downloaded documents
    #[arg(long, value_name = "DIR")]
    out: Option<String>,

    /// Maximum crawl depth
    #[arg(long, value_name = "N")]
    depth: Option<u32>,

    /// Minimum delay between requests, in seconds
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    /// Crawl the whole site, not only URLs under the start path
    #[arg(long)]
    all_paths: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(start) = &self.start {
            config.crawler.start_url = start.clone();
        }
        if let Some(out) = &self.out {
            config.output.directory = out.clone();
        }
        if let Some(depth) = self.depth {
            config.crawler.max_depth = depth;
        }
        if let Some(delay) = self.delay {
            config.crawler.delay_secs = delay;
        }
        if self.all_paths {
            config.crawler.same_path_only = false;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("doc_harvest=info,warn"),
            1 => EnvFilter::new("doc_harvest=debug,info"),
            2 => EnvFilter::new("doc_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config) {
    println!("=== Doc-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Delay: {}s", config.crawler.delay_secs);
    println!(
        "  Scope: {}",
        if config.crawler.same_path_only {
            "same path only"
        } else {
            "whole site"
        }
    );
    println!("  Timeout: {}s", config.crawler.timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nRetry:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!("  Backoff factor: {}s", config.retry.backoff_factor);
    println!("  Statuses: {:?}", config.retry.statuses);

    println!("\nDocuments:");
    println!(
        "  Extension: {} (content type {})",
        config.document.extension, config.document.content_type
    );
    println!("  Output directory: {}", config.output.directory);
    println!(
        "  robots.txt unavailable: {}",
        if config.robots.fail_open {
            "allow all"
        } else {
            "deny all"
        }
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
///
/// Ctrl-C aborts the run immediately with exit status 1.
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let summary = tokio::select! {
        result = run_crawl(config) => result.context("Crawl failed")?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted by user.");
            std::process::exit(1);
        }
    };

    print_summary(&summary);
    Ok(())
}

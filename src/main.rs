//! Jobsweep main entry point
//!
//! Command-line interface for the jobsweep jobs-board scraper.

use clap::Parser;
use jobsweep::config::load_config;
use jobsweep::crawler::run_scrape;
use jobsweep::url::{build_search_pages, cities_for, to_canonical_fetch_form};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Jobsweep: a budgeted jobs-board scraper
///
/// Jobsweep crawls a public jobs-search site, joins each posting to its
/// detail page and employer profile, and writes one flat JSON record per
/// job, under a global result budget and a polite backoff policy.
#[derive(Parser, Debug)]
#[command(name = "jobsweep")]
#[command(version = "1.0.0")]
#[command(about = "A budgeted jobs-board scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the seed plan without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(());
    }

    match run_scrape(config).await {
        Ok(summary) => {
            tracing::info!(
                "Scrape finished: {} records pushed (sharded: {})",
                summary.pushed,
                summary.sharded
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("jobsweep=info,warn"),
            1 => EnvFilter::new("jobsweep=debug,info"),
            2 => EnvFilter::new("jobsweep=trace,debug"),
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

/// Handles --dry-run: validates config and shows what would be crawled
fn handle_dry_run(config: &jobsweep::Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Jobsweep Dry Run ===\n");

    println!("Target: {}", config.crawler.base_url);
    println!("Budget: {} records", config.search.max_items);
    println!(
        "Waves: details={}, company={}",
        config.search.scrape_job_details, config.search.scrape_company
    );
    println!(
        "Concurrency: {} fetches, {} retries max",
        config.crawler.max_concurrent_fetches, config.crawler.max_retries
    );

    println!("\nStart URLs ({}):", config.search.start_urls.len());
    for raw in &config.search.start_urls {
        match to_canonical_fetch_form(raw) {
            Ok(url) => println!("  - {}", url),
            Err(e) => println!("  - {} (skipped: {})", raw, e),
        }
    }

    let base = url::Url::parse(&config.crawler.base_url)?;
    println!("\nKeyword searches ({}):", config.search.keywords.len());
    for keyword in &config.search.keywords {
        let shard_cities = config
            .search
            .target_country
            .as_deref()
            .filter(|_| config.search.split_by_location)
            .and_then(cities_for);

        match shard_cities {
            Some(cities) => {
                println!("  - '{}' sharded across {} cities:", keyword, cities.len());
                for city in cities {
                    let pages = build_search_pages(
                        &base,
                        keyword,
                        city,
                        config.search.date_posted.as_deref(),
                        config.search.max_items,
                    );
                    println!("    * {} ({} pages)", city, pages.len());
                }
            }
            None => {
                let pages = build_search_pages(
                    &base,
                    keyword,
                    &config.search.location,
                    config.search.date_posted.as_deref(),
                    config.search.max_items,
                );
                println!(
                    "  - '{}' in '{}' ({} pages)",
                    keyword, config.search.location, pages.len()
                );
            }
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

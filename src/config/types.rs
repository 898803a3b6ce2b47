use serde::Deserialize;

/// Main configuration structure for jobsweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// What to search for and how much of it to collect
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Explicit search-page URLs to seed from (may be empty)
    #[serde(rename = "start-urls", default)]
    pub start_urls: Vec<String>,

    /// Search keywords; each keyword becomes its own search
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Location string passed to keyword searches
    #[serde(default)]
    pub location: String,

    /// Maximum number of output records for the run
    #[serde(rename = "max-items")]
    pub max_items: usize,

    /// Optional posted-date filter token (e.g. "past-week")
    #[serde(rename = "date-posted", default)]
    pub date_posted: Option<String>,

    /// Fetch each job's detail page
    #[serde(rename = "scrape-job-details", default = "default_true")]
    pub scrape_job_details: bool,

    /// Fetch each employer's company page
    #[serde(rename = "scrape-company", default = "default_true")]
    pub scrape_company: bool,

    /// Split each keyword search into one sub-search per city
    #[serde(rename = "split-by-location", default)]
    pub split_by_location: bool,

    /// Country key into the city catalog, required when splitting
    #[serde(rename = "target-country", default)]
    pub target_country: Option<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Base URL of the target jobs board
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum number of concurrent fetches
    #[serde(rename = "max-concurrent-fetches", default = "default_concurrency")]
    pub max_concurrent_fetches: u32,

    /// Maximum retry attempts for a rate-limited fetch
    #[serde(rename = "max-retries", default = "default_retries")]
    pub max_retries: u32,

    /// Base delay before the first retry (milliseconds); doubles per attempt
    #[serde(rename = "retry-initial-delay-ms", default = "default_retry_delay")]
    pub retry_initial_delay_ms: u64,

    /// Global dispatch pause after a rate-limited search page (milliseconds)
    #[serde(rename = "search-cooldown-ms", default = "default_cooldown")]
    pub search_cooldown_ms: u64,

    /// Minimum time between consecutive dispatches (milliseconds)
    #[serde(rename = "min-dispatch-interval-ms", default = "default_interval")]
    pub min_dispatch_interval_ms: u64,

    /// User-agent strings to rotate through; built-in defaults when empty
    #[serde(rename = "user-agents", default)]
    pub user_agents: Vec<String>,

    /// Proxy URLs to rotate through; direct connection when empty
    #[serde(default)]
    pub proxies: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON-lines records file
    #[serde(rename = "records-path")]
    pub records_path: String,

    /// Path to the run summary JSON file
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> u32 {
    3
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2000
}

fn default_cooldown() -> u64 {
    5000
}

fn default_interval() -> u64 {
    500
}

use chrono::{DateTime, Utc};
use serde::Serialize;

/// End-of-run summary
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Total records pushed to the sink
    pub pushed: usize,

    /// Number of start URLs that seeded the run
    pub start_urls: usize,

    /// Number of search keywords
    pub keywords: usize,

    /// Whether location sharding was used
    pub sharded: bool,

    /// Completion timestamp
    pub finished_at: DateTime<Utc>,
}

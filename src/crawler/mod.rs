//! Crawl execution
//!
//! This module contains the moving parts of a run:
//! - HTTP fetching with identity rotation and transport retry
//! - The dispatch scheduler (priority frontier, backoff, politeness)
//! - The request router (the orchestration state machine)
//! - The coordinator event loop tying them together

mod coordinator;
mod fetcher;
mod router;
mod scheduler;

pub use coordinator::{run_scrape, Coordinator};
pub use fetcher::{build_http_client, fetch_url, FetchOutcome, Identity, IdentityPool};
pub use router::{FetchRequest, RequestKind, RouteAction, Router};
pub use scheduler::Scheduler;

//! Orchestrator-owned crawl state
//!
//! All structures here are owned exclusively by the router and mutated only
//! inside its serialized decision step; workers and sinks never touch them.

mod company_cache;

pub use company_cache::{CompanyCache, JoinOutcome};

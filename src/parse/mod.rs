//! Page parsing
//!
//! Turns fetched markup into flat field records. The [`PageParser`] trait is
//! the seam between the orchestrator and the extraction logic, so tests can
//! substitute synthetic fixtures and the login-wall heuristic stays
//! swappable policy rather than hard contract.

mod blocked;
mod html;

pub use blocked::BlockPolicy;
pub use html::HtmlParser;

use crate::record::{CompanyFields, JobDetailFields, JobSummary};
use url::Url;

/// Converts fetched markup into field records
pub trait PageParser: Send + Sync {
    /// Parses the job-summary cards out of a search-results page
    ///
    /// Cards missing a usable job link are skipped; siblings continue.
    fn parse_search_results(&self, markup: &str, base: &Url) -> Vec<JobSummary>;

    /// Parses a job detail page
    fn parse_job_detail(&self, markup: &str, base: &Url) -> JobDetailFields;

    /// Parses an employer's company page
    fn parse_company_page(&self, markup: &str, base: &Url) -> CompanyFields;

    /// Classifies a response as an auth wall rather than genuine content
    ///
    /// A page containing recognizable job or company content is never
    /// classified as a login wall, even if it also carries login-related
    /// markup - public pages always expose a sign-in affordance.
    fn is_blocked(&self, markup: &str, status_code: u16) -> bool;
}

use crate::{UrlError, UrlResult};
use url::Url;

/// Number of job cards the site returns per search page
pub const PAGE_SIZE: usize = 25;

/// One paginated search request descriptor
///
/// The URL doubles as the request's stable identity for dedup at the fetch
/// layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub url: Url,
    pub offset: u32,
}

/// Builds the paginated search URLs for one (keywords, location) pair
///
/// One descriptor per pagination offset, `ceil(max_items / PAGE_SIZE)` of
/// them, so the search can yield at most `max_items` cards before the
/// orchestrator stops it anyway.
///
/// # Arguments
///
/// * `base` - Base URL of the jobs board
/// * `keywords` - Search keywords
/// * `location` - Location string (omitted from the query when empty)
/// * `date_posted` - Optional posted-date filter token
/// * `max_items` - The run's result budget
pub fn build_search_pages(
    base: &Url,
    keywords: &str,
    location: &str,
    date_posted: Option<&str>,
    max_items: usize,
) -> Vec<SearchPage> {
    let page_count = max_items.div_ceil(PAGE_SIZE);

    let mut pages = Vec::with_capacity(page_count);
    for page in 0..page_count {
        let offset = (page * PAGE_SIZE) as u32;

        let mut url = match base.join("/jobs/api/search") {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!("Cannot build search URL from base {}: {}", base, e);
                return pages;
            }
        };

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("keywords", keywords);
            if !location.is_empty() {
                query.append_pair("location", location);
            }
            if let Some(token) = date_posted {
                query.append_pair("posted", token);
            }
            query.append_pair("start", &offset.to_string());
        }

        pages.push(SearchPage { url, offset });
    }

    pages
}

/// Normalizes a user-supplied search-page URL into the fetchable endpoint
///
/// Rewrites the human-facing `/jobs/search` path to the paginated
/// `/jobs/api/search` endpoint, preserves every query parameter, drops the
/// fragment, and defaults the `start` offset to 0 when absent.
///
/// Idempotent: applying it twice yields the same result as once.
///
/// # Errors
///
/// Malformed input yields a `UrlError`; callers treat that as skip, never
/// fatal - a bad entry among several start URLs must not abort the run.
pub fn to_canonical_fetch_form(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    if url.path() == "/jobs/search" {
        url.set_path("/jobs/api/search");
    }

    url.set_fragment(None);

    let has_start = url.query_pairs().any(|(key, _)| key == "start");
    if !has_start {
        url.query_pairs_mut().append_pair("start", "0");
    }

    Ok(url)
}

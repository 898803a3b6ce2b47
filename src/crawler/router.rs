//! Request router - the crawl state machine
//!
//! Classifies each completed fetch by request kind, drives pagination,
//! dedups jobs across overlapping searches, runs the company-join protocol,
//! enforces the global result budget, and decides retry-vs-degrade on
//! failure. Every decision comes back as an explicit [`RouteAction`] value;
//! the router itself never performs I/O.
//!
//! All router state (seen-id set, company cache, budget counters) is
//! mutated only inside [`Router::route`], which the coordinator calls for
//! one completion at a time. That single serialized decision path is what
//! keeps the at-most-once company fetch invariant intact while many fetches
//! are in flight.

use crate::config::Config;
use crate::crawler::fetcher::{FetchOutcome, Identity, IdentityPool};
use crate::parse::PageParser;
use crate::record::{CompanyFields, CompanyKey, JobId, JobRecord, OutputRecord};
use crate::state::{CompanyCache, JoinOutcome};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// The three request kinds, each carrying its own typed context
#[derive(Debug)]
pub enum RequestKind {
    Search {
        offset: u32,
    },
    /// Carries the partial record accumulated so far
    JobDetail {
        job: Box<JobRecord>,
    },
    Company {
        key: CompanyKey,
    },
}

/// One fetch request as dispatched to the worker pool
#[derive(Debug)]
pub struct FetchRequest {
    pub url: Url,
    pub kind: RequestKind,
    /// Retry attempt count for this logical request
    pub attempt: u32,
    pub identity: Identity,
}

/// Decision produced by routing one completed fetch
#[derive(Debug)]
pub enum RouteAction {
    /// Dispatch a new or retried fetch, optionally after a backoff delay
    Dispatch {
        request: FetchRequest,
        delay: Option<Duration>,
    },
    /// Push a finalized record to the result sink
    Push(OutputRecord),
    /// Pause all dispatching briefly (rate-limited search leniency)
    CoolDown(Duration),
}

/// The orchestrator state machine
pub struct Router {
    base_url: Url,
    scrape_details: bool,
    scrape_company: bool,
    max_items: usize,
    max_retries: u32,
    retry_initial_delay: Duration,
    search_cooldown: Duration,
    parser: Arc<dyn PageParser>,
    identities: IdentityPool,
    /// Job ids already dispatched for detail-fetching or already pushed
    seen: HashSet<JobId>,
    cache: CompanyCache,
    /// Jobs that entered the pipeline (dispatched or pushed summary-only)
    dispatched: usize,
    /// Records pushed to the sink
    pushed: usize,
}

impl Router {
    pub fn new(config: &Config, base_url: Url, parser: Arc<dyn PageParser>) -> Self {
        Self {
            base_url,
            scrape_details: config.search.scrape_job_details,
            scrape_company: config.search.scrape_company,
            max_items: config.search.max_items,
            max_retries: config.crawler.max_retries,
            retry_initial_delay: Duration::from_millis(config.crawler.retry_initial_delay_ms),
            search_cooldown: Duration::from_millis(config.crawler.search_cooldown_ms),
            parser,
            identities: IdentityPool::new(
                config.crawler.proxies.clone(),
                config.crawler.user_agents.clone(),
            ),
            seen: HashSet::new(),
            cache: CompanyCache::new(),
            dispatched: 0,
            pushed: 0,
        }
    }

    /// Builds a search request with a fresh identity (used for seeding)
    pub fn search_request(&mut self, url: Url, offset: u32) -> FetchRequest {
        FetchRequest {
            url,
            kind: RequestKind::Search { offset },
            attempt: 0,
            identity: self.identities.next(),
        }
    }

    /// Whether new search/detail work may still enter the pipeline
    pub fn budget_left(&self) -> bool {
        self.dispatched < self.max_items
    }

    pub fn pushed(&self) -> usize {
        self.pushed
    }

    /// Routes one completed fetch - the serialized decision step
    pub fn route(&mut self, request: FetchRequest, outcome: FetchOutcome) -> Vec<RouteAction> {
        let url = request.url;
        let attempt = request.attempt;

        match request.kind {
            RequestKind::Search { offset } => self.on_search(&url, offset, outcome),
            RequestKind::JobDetail { job } => self.on_job_detail(&url, *job, attempt, outcome),
            RequestKind::Company { key } => self.on_company(&url, key, attempt, outcome),
        }
    }

    fn on_search(&mut self, url: &Url, offset: u32, outcome: FetchOutcome) -> Vec<RouteAction> {
        if !self.budget_left() {
            tracing::debug!("Budget reached; discarding search page at offset {}", offset);
            return Vec::new();
        }

        let (status_code, body) = match outcome {
            FetchOutcome::NetworkError { error } => {
                tracing::warn!("Search page {} failed: {}; skipping", url, error);
                return Vec::new();
            }
            FetchOutcome::Response { status_code, body } => (status_code, body),
        };

        // Rate-limited (or walled) search pages are dropped, not retried:
        // subsequent offsets continue independently, the run just cools off.
        if is_rate_limited(status_code) || self.parser.is_blocked(&body, status_code) {
            tracing::warn!(
                "Search page at offset {} soft-blocked (HTTP {}); cooling down",
                offset,
                status_code
            );
            return vec![RouteAction::CoolDown(self.search_cooldown)];
        }

        if !is_success(status_code) {
            tracing::warn!(
                "Search page at offset {} returned HTTP {}; skipping",
                offset,
                status_code
            );
            return Vec::new();
        }

        let cards = self.parser.parse_search_results(&body, url);
        tracing::debug!("Search page at offset {} yielded {} cards", offset, cards.len());

        let mut actions = Vec::new();
        for summary in cards {
            let id = match JobId::from_job_url(&summary.job_url) {
                Some(id) => id,
                None => {
                    tracing::debug!("Card without a job id at {}; skipping", summary.job_url);
                    continue;
                }
            };

            if self.seen.contains(&id) {
                continue;
            }

            if self.scrape_details {
                if self.dispatched >= self.max_items {
                    break;
                }
                self.seen.insert(id.clone());
                self.dispatched += 1;

                let job = JobRecord::new(id, summary);
                let detail_url = job.summary.job_url.clone();
                actions.push(RouteAction::Dispatch {
                    request: FetchRequest {
                        url: detail_url,
                        kind: RequestKind::JobDetail { job: Box::new(job) },
                        attempt: 0,
                        identity: self.identities.next(),
                    },
                    delay: None,
                });
            } else {
                if self.pushed >= self.max_items {
                    break;
                }
                self.seen.insert(id.clone());
                self.dispatched += 1;
                actions.push(self.push(JobRecord::new(id, summary)));
            }
        }

        actions
    }

    fn on_job_detail(
        &mut self,
        url: &Url,
        mut job: JobRecord,
        attempt: u32,
        outcome: FetchOutcome,
    ) -> Vec<RouteAction> {
        if self.pushed >= self.max_items {
            tracing::debug!("Budget reached; discarding detail result for {}", job.id);
            return Vec::new();
        }

        let (status_code, body) = match outcome {
            FetchOutcome::NetworkError { error } => {
                // Partial data beats no data
                tracing::warn!("Detail fetch for {} failed: {}; pushing summary", job.id, error);
                return vec![self.push(job)];
            }
            FetchOutcome::Response { status_code, body } => (status_code, body),
        };

        if is_rate_limited(status_code) {
            if attempt >= self.max_retries {
                tracing::warn!(
                    "Detail fetch for {} rate-limited after {} attempts; pushing summary",
                    job.id,
                    attempt + 1
                );
                return vec![self.push(job)];
            }
            return vec![self.retry_detail(url.clone(), job, attempt)];
        }

        if !is_success(status_code) || self.parser.is_blocked(&body, status_code) {
            tracing::warn!(
                "Detail page for {} unavailable (HTTP {}); pushing summary",
                job.id,
                status_code
            );
            return vec![self.push(job)];
        }

        job.merge_detail(self.parser.parse_job_detail(&body, url));

        if !self.scrape_company {
            return vec![self.push(job)];
        }

        let key = job
            .summary
            .company_url
            .as_deref()
            .and_then(CompanyKey::from_profile_url);
        let key = match key {
            Some(key) => key,
            None => return vec![self.push(job)],
        };

        match self.cache.join(key.clone(), job) {
            JoinOutcome::Resolved { mut job, fields } => {
                job.merge_company(fields);
                vec![self.push(job)]
            }
            JoinOutcome::FetchNeeded => {
                let company_url = match self.base_url.join(&format!("/company/{}", key)) {
                    Ok(u) => u,
                    Err(e) => {
                        // Underivable URL: resolve the key to a tombstone now
                        tracing::warn!("Cannot build company URL for {}: {}", key, e);
                        return self.resolve_company(&key, None);
                    }
                };
                vec![RouteAction::Dispatch {
                    request: FetchRequest {
                        url: company_url,
                        kind: RequestKind::Company { key },
                        attempt: 0,
                        identity: self.identities.next(),
                    },
                    delay: None,
                }]
            }
            JoinOutcome::Parked => Vec::new(),
        }
    }

    fn on_company(
        &mut self,
        url: &Url,
        key: CompanyKey,
        attempt: u32,
        outcome: FetchOutcome,
    ) -> Vec<RouteAction> {
        let (status_code, body) = match outcome {
            FetchOutcome::NetworkError { error } => {
                tracing::warn!("Company fetch for {} failed: {}; tombstoning", key, error);
                return self.resolve_company(&key, None);
            }
            FetchOutcome::Response { status_code, body } => (status_code, body),
        };

        // Rate limits and auth walls on a company page are worth retrying
        // with a fresh identity; a blocked identity will keep failing.
        if is_rate_limited(status_code) || self.parser.is_blocked(&body, status_code) {
            if attempt >= self.max_retries {
                tracing::warn!(
                    "Company {} blocked after {} attempts; tombstoning",
                    key,
                    attempt + 1
                );
                return self.resolve_company(&key, None);
            }
            let delay = self.backoff(attempt);
            tracing::debug!(
                "Company {} blocked (HTTP {}); retry {} in {:?}",
                key,
                status_code,
                attempt + 1,
                delay
            );
            return vec![RouteAction::Dispatch {
                request: FetchRequest {
                    url: url.clone(),
                    kind: RequestKind::Company { key },
                    attempt: attempt + 1,
                    identity: self.identities.next(),
                },
                delay: Some(delay),
            }];
        }

        if !is_success(status_code) {
            tracing::warn!(
                "Company page for {} returned HTTP {}; tombstoning",
                key,
                status_code
            );
            return self.resolve_company(&key, None);
        }

        let fields = self.parser.parse_company_page(&body, url);
        self.resolve_company(&key, Some(fields))
    }

    /// Resolves the cache entry and fans the fields out to every waiting job
    fn resolve_company(
        &mut self,
        key: &CompanyKey,
        fields: Option<CompanyFields>,
    ) -> Vec<RouteAction> {
        let waiting = self.cache.resolve(key, fields.clone());
        tracing::debug!("Company {} resolved; fanning out to {} jobs", key, waiting.len());

        waiting
            .into_iter()
            .map(|mut job| {
                job.merge_company(fields.clone());
                self.push(job)
            })
            .collect()
    }

    fn retry_detail(&mut self, url: Url, job: JobRecord, attempt: u32) -> RouteAction {
        let delay = self.backoff(attempt);
        tracing::debug!(
            "Detail fetch for {} rate-limited; retry {} in {:?}",
            job.id,
            attempt + 1,
            delay
        );
        RouteAction::Dispatch {
            request: FetchRequest {
                url,
                kind: RequestKind::JobDetail { job: Box::new(job) },
                attempt: attempt + 1,
                identity: self.identities.next(),
            },
            delay: Some(delay),
        }
    }

    fn push(&mut self, job: JobRecord) -> RouteAction {
        self.pushed += 1;
        RouteAction::Push(job.into_output())
    }

    /// Exponential backoff with jitter as a function of attempt count
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.retry_initial_delay * 2u32.saturating_pow(attempt);
        let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
        base + jitter
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Explicit "too many requests" or an equivalent soft-block status
fn is_rate_limited(status: u16) -> bool {
    status == 429 || status == 503
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, OutputConfig, SearchConfig};
    use crate::record::{JobDetailFields, JobSummary};

    /// Parser over a line-oriented synthetic fixture format:
    /// search pages list cards as "JOB <id> <company-slug|->", detail and
    /// company pages are free text that lands in the description field, and
    /// any page containing "WALLED" classifies as blocked.
    struct MockParser;

    impl PageParser for MockParser {
        fn parse_search_results(&self, markup: &str, base: &Url) -> Vec<JobSummary> {
            markup
                .lines()
                .filter_map(|line| {
                    let mut parts = line.split_whitespace();
                    if parts.next() != Some("JOB") {
                        return None;
                    }
                    let id = parts.next()?;
                    let slug = parts.next()?;

                    let job_url = if id == "-" {
                        base.clone()
                    } else {
                        base.join(&format!("/jobs/view/{}", id)).ok()?
                    };
                    let company_url = if slug == "-" {
                        None
                    } else {
                        Some(format!("{}company/{}", base, slug))
                    };

                    Some(JobSummary {
                        title: Some(format!("Job {}", id)),
                        company_name: None,
                        company_url,
                        location: None,
                        posted_at: None,
                        salary_info: vec![],
                        benefits: vec![],
                        job_url,
                    })
                })
                .collect()
        }

        fn parse_job_detail(&self, markup: &str, _base: &Url) -> JobDetailFields {
            JobDetailFields {
                description: Some(markup.trim().to_string()),
                ..Default::default()
            }
        }

        fn parse_company_page(&self, markup: &str, _base: &Url) -> CompanyFields {
            CompanyFields {
                description: Some(markup.trim().to_string()),
                ..Default::default()
            }
        }

        fn is_blocked(&self, markup: &str, _status_code: u16) -> bool {
            markup.contains("WALLED")
        }
    }

    fn base() -> Url {
        Url::parse("https://boards.example.com/").unwrap()
    }

    fn create_test_config(max_items: usize, details: bool, company: bool) -> Config {
        Config {
            search: SearchConfig {
                start_urls: vec![],
                keywords: vec!["rust".to_string()],
                location: String::new(),
                max_items,
                date_posted: None,
                scrape_job_details: details,
                scrape_company: company,
                split_by_location: false,
                target_country: None,
            },
            crawler: CrawlerConfig {
                base_url: "https://boards.example.com".to_string(),
                max_concurrent_fetches: 3,
                max_retries: 3,
                retry_initial_delay_ms: 100,
                search_cooldown_ms: 5000,
                min_dispatch_interval_ms: 0,
                user_agents: vec!["ua-a".to_string(), "ua-b".to_string()],
                proxies: vec![],
            },
            output: OutputConfig {
                records_path: "./jobs.jsonl".to_string(),
                summary_path: "./summary.json".to_string(),
            },
        }
    }

    fn create_test_router(max_items: usize, details: bool, company: bool) -> Router {
        let config = create_test_config(max_items, details, company);
        Router::new(&config, base(), Arc::new(MockParser))
    }

    fn search_completion(router: &mut Router, body: &str) -> Vec<RouteAction> {
        let request = router.search_request(base().join("/jobs/api/search?start=0").unwrap(), 0);
        router.route(
            request,
            FetchOutcome::Response {
                status_code: 200,
                body: body.to_string(),
            },
        )
    }

    fn search_body(ids: &[(&str, &str)]) -> String {
        ids.iter()
            .map(|(id, slug)| format!("JOB {} {}", id, slug))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Routes a response through the only Dispatch action in `actions`
    fn complete_dispatch(
        router: &mut Router,
        actions: Vec<RouteAction>,
        status_code: u16,
        body: &str,
    ) -> Vec<RouteAction> {
        let mut dispatched: Vec<FetchRequest> = actions
            .into_iter()
            .filter_map(|action| match action {
                RouteAction::Dispatch { request, .. } => Some(request),
                _ => None,
            })
            .collect();
        assert_eq!(dispatched.len(), 1, "expected exactly one dispatch");
        router.route(
            dispatched.pop().unwrap(),
            FetchOutcome::Response {
                status_code,
                body: body.to_string(),
            },
        )
    }

    fn pushed_records(actions: &[RouteAction]) -> Vec<&OutputRecord> {
        actions
            .iter()
            .filter_map(|action| match action {
                RouteAction::Push(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    fn dispatch_count(actions: &[RouteAction]) -> usize {
        actions
            .iter()
            .filter(|action| matches!(action, RouteAction::Dispatch { .. }))
            .count()
    }

    // Scenario A: summary-only run caps pushes at the budget, company and
    // detail fields stay null.
    #[test]
    fn test_summary_only_run_respects_budget() {
        let mut router = create_test_router(25, false, false);

        let cards: Vec<(String, &str)> =
            (0..30).map(|i| (format!("{}", 1000 + i), "acme")).collect();
        let body = cards
            .iter()
            .map(|(id, slug)| format!("JOB {} {}", id, slug))
            .collect::<Vec<_>>()
            .join("\n");

        let actions = search_completion(&mut router, &body);

        let pushed = pushed_records(&actions);
        assert_eq!(pushed.len(), 25);
        assert_eq!(dispatch_count(&actions), 0);
        assert_eq!(router.pushed(), 25);
        assert!(!router.budget_left());

        for record in pushed {
            assert!(record.description.is_none());
            assert!(record.company_description.is_none());
        }
    }

    // Scenario B: overlapping searches yield each id exactly once.
    #[test]
    fn test_dedup_across_overlapping_searches() {
        let mut router = create_test_router(100, false, false);

        let shared: Vec<(String, &str)> = (0..10).map(|i| (format!("{}", i), "-")).collect();
        let mut first: Vec<(&str, &str)> =
            shared.iter().map(|(id, s)| (id.as_str(), *s)).collect();
        let extra_a = [("100", "-"), ("101", "-")];
        first.extend_from_slice(&extra_a);

        let mut second: Vec<(&str, &str)> =
            shared.iter().map(|(id, s)| (id.as_str(), *s)).collect();
        let extra_b = [("200", "-"), ("201", "-"), ("202", "-")];
        second.extend_from_slice(&extra_b);

        let actions_a = search_completion(&mut router, &search_body(&first));
        let actions_b = search_completion(&mut router, &search_body(&second));

        assert_eq!(pushed_records(&actions_a).len(), 12);
        assert_eq!(pushed_records(&actions_b).len(), 3, "only the new ids push");
        assert_eq!(router.pushed(), 15);
    }

    #[test]
    fn test_detail_mode_dispatches_instead_of_pushing() {
        let mut router = create_test_router(10, true, false);

        let actions = search_completion(&mut router, &search_body(&[("1", "-"), ("2", "-")]));

        assert_eq!(dispatch_count(&actions), 2);
        assert_eq!(pushed_records(&actions).len(), 0);
        assert_eq!(router.pushed(), 0);
    }

    #[test]
    fn test_detail_success_without_company_pushes_merged_record() {
        let mut router = create_test_router(10, true, false);

        let actions = search_completion(&mut router, &search_body(&[("1", "acme")]));
        let actions = complete_dispatch(&mut router, actions, 200, "A fine job.");

        let pushed = pushed_records(&actions);
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].description.as_deref(), Some("A fine job."));
        assert!(pushed[0].company_description.is_none());
    }

    #[test]
    fn test_job_without_company_key_skips_join() {
        let mut router = create_test_router(10, true, true);

        let actions = search_completion(&mut router, &search_body(&[("1", "-")]));
        let actions = complete_dispatch(&mut router, actions, 200, "Detail.");

        let pushed = pushed_records(&actions);
        assert_eq!(pushed.len(), 1);
        assert!(pushed[0].company_description.is_none());
    }

    // The coordination core: N jobs, same company, one fetch, full fan-out.
    #[test]
    fn test_company_join_fans_out_to_all_waiting_jobs() {
        let mut router = create_test_router(10, true, true);

        let actions = search_completion(
            &mut router,
            &search_body(&[("1", "acme"), ("2", "acme"), ("3", "acme")]),
        );
        let mut details: Vec<FetchRequest> = actions
            .into_iter()
            .filter_map(|action| match action {
                RouteAction::Dispatch { request, .. } => Some(request),
                _ => None,
            })
            .collect();
        assert_eq!(details.len(), 3);

        // First detail completion launches the one company fetch
        let first = router.route(
            details.remove(0),
            FetchOutcome::Response {
                status_code: 200,
                body: "Detail one.".to_string(),
            },
        );
        assert_eq!(dispatch_count(&first), 1);
        assert_eq!(pushed_records(&first).len(), 0);

        // The other two park behind it
        for request in details {
            let actions = router.route(
                request,
                FetchOutcome::Response {
                    status_code: 200,
                    body: "Detail more.".to_string(),
                },
            );
            assert_eq!(dispatch_count(&actions), 0, "no duplicate company fetch");
            assert_eq!(pushed_records(&actions).len(), 0);
        }

        // Company resolution fans out to all three
        let actions = complete_dispatch(&mut router, first, 200, "About Acme.");
        let pushed = pushed_records(&actions);
        assert_eq!(pushed.len(), 3);
        for record in pushed {
            assert_eq!(record.company_description.as_deref(), Some("About Acme."));
        }
        assert_eq!(router.pushed(), 3);
    }

    // Scenario C: rate-limited twice, then success; one logical fetch.
    #[test]
    fn test_company_retry_sequence_then_success() {
        let mut router = create_test_router(10, true, true);

        let actions = search_completion(&mut router, &search_body(&[("1", "acme")]));
        let actions = complete_dispatch(&mut router, actions, 200, "Detail.");
        assert_eq!(dispatch_count(&actions), 1);

        // Two rate-limited attempts, each a retry with backoff
        let retry_one = complete_dispatch(&mut router, actions, 429, "");
        let delay_present = retry_one.iter().any(|action| {
            matches!(
                action,
                RouteAction::Dispatch {
                    delay: Some(_),
                    request: FetchRequest { attempt: 1, .. },
                }
            )
        });
        assert!(delay_present, "retry must carry backoff delay and attempt 1");

        let retry_two = complete_dispatch(&mut router, retry_one, 429, "");
        assert_eq!(dispatch_count(&retry_two), 1);

        // Third attempt succeeds and fans out
        let actions = complete_dispatch(&mut router, retry_two, 200, "About Acme.");
        let pushed = pushed_records(&actions);
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].company_description.as_deref(), Some("About Acme."));
    }

    // Scenario D: permanently blocked company tombstones; jobs still push.
    #[test]
    fn test_company_permanent_block_pushes_degraded_records() {
        let mut router = create_test_router(10, true, true);

        let actions = search_completion(&mut router, &search_body(&[("1", "acme"), ("2", "acme")]));
        let mut requests: Vec<FetchRequest> = actions
            .into_iter()
            .filter_map(|action| match action {
                RouteAction::Dispatch { request, .. } => Some(request),
                _ => None,
            })
            .collect();

        let mut actions = router.route(
            requests.remove(0),
            FetchOutcome::Response {
                status_code: 200,
                body: "Detail.".to_string(),
            },
        );
        let parked = router.route(
            requests.remove(0),
            FetchOutcome::Response {
                status_code: 200,
                body: "Detail.".to_string(),
            },
        );
        assert!(parked.is_empty());

        // max_retries = 3: attempts 0..=3 all rate-limited, then tombstone
        for _ in 0..3 {
            actions = complete_dispatch(&mut router, actions, 429, "");
        }
        let final_actions = complete_dispatch(&mut router, actions, 429, "");

        let pushed = pushed_records(&final_actions);
        assert_eq!(pushed.len(), 2, "all waiting jobs push on tombstone");
        for record in pushed {
            assert!(record.company_description.is_none());
        }
    }

    #[test]
    fn test_resolved_company_serves_later_jobs_from_cache() {
        let mut router = create_test_router(10, true, true);

        let actions = search_completion(&mut router, &search_body(&[("1", "acme")]));
        let actions = complete_dispatch(&mut router, actions, 200, "Detail.");
        let actions = complete_dispatch(&mut router, actions, 200, "About Acme.");
        assert_eq!(pushed_records(&actions).len(), 1);

        // A later job for the same company must not trigger another fetch
        let actions = search_completion(&mut router, &search_body(&[("2", "acme")]));
        let actions = complete_dispatch(&mut router, actions, 200, "Detail two.");

        assert_eq!(dispatch_count(&actions), 0);
        let pushed = pushed_records(&actions);
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].company_description.as_deref(), Some("About Acme."));
    }

    #[test]
    fn test_detail_rate_limit_retries_then_degrades() {
        let mut router = create_test_router(10, true, false);

        let mut actions = search_completion(&mut router, &search_body(&[("1", "-")]));
        for _ in 0..4 {
            actions = complete_dispatch(&mut router, actions, 429, "");
        }

        // Retries exhausted: the summary-only record is pushed, not dropped
        let pushed = pushed_records(&actions);
        assert_eq!(pushed.len(), 1);
        assert!(pushed[0].description.is_none());
        assert_eq!(pushed[0].title.as_deref(), Some("Job 1"));
    }

    #[test]
    fn test_detail_login_wall_pushes_partial_record() {
        let mut router = create_test_router(10, true, true);

        let actions = search_completion(&mut router, &search_body(&[("1", "acme")]));
        let actions = complete_dispatch(&mut router, actions, 200, "WALLED sign in");

        let pushed = pushed_records(&actions);
        assert_eq!(pushed.len(), 1);
        assert!(pushed[0].description.is_none());
        assert_eq!(dispatch_count(&actions), 0, "no company fetch for a walled job");
    }

    #[test]
    fn test_detail_http_error_pushes_partial_record() {
        let mut router = create_test_router(10, true, false);

        let actions = search_completion(&mut router, &search_body(&[("1", "-")]));
        let actions = complete_dispatch(&mut router, actions, 500, "oops");

        assert_eq!(pushed_records(&actions).len(), 1);
    }

    #[test]
    fn test_detail_network_error_pushes_partial_record() {
        let mut router = create_test_router(10, true, false);

        let actions = search_completion(&mut router, &search_body(&[("1", "-")]));
        let mut requests: Vec<FetchRequest> = actions
            .into_iter()
            .filter_map(|action| match action {
                RouteAction::Dispatch { request, .. } => Some(request),
                _ => None,
            })
            .collect();

        let actions = router.route(
            requests.pop().unwrap(),
            FetchOutcome::NetworkError {
                error: "connection reset".to_string(),
            },
        );
        assert_eq!(pushed_records(&actions).len(), 1);
    }

    #[test]
    fn test_rate_limited_search_cools_down_without_retry() {
        let mut router = create_test_router(10, true, false);

        let request = router.search_request(base().join("/jobs/api/search?start=0").unwrap(), 0);
        let actions = router.route(
            request,
            FetchOutcome::Response {
                status_code: 429,
                body: String::new(),
            },
        );

        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], RouteAction::CoolDown(_)));
    }

    #[test]
    fn test_failed_search_is_skipped() {
        let mut router = create_test_router(10, true, false);

        let request = router.search_request(base().join("/jobs/api/search?start=0").unwrap(), 0);
        let actions = router.route(
            request,
            FetchOutcome::Response {
                status_code: 500,
                body: String::new(),
            },
        );
        assert!(actions.is_empty());

        let request = router.search_request(base().join("/jobs/api/search?start=25").unwrap(), 25);
        let actions = router.route(
            request,
            FetchOutcome::NetworkError {
                error: "dns failure".to_string(),
            },
        );
        assert!(actions.is_empty());
    }

    // Scenario E core: the dispatch budget stops detail fan-out mid-page.
    #[test]
    fn test_dispatch_budget_caps_detail_fan_out() {
        let mut router = create_test_router(2, true, false);

        let actions = search_completion(
            &mut router,
            &search_body(&[("1", "-"), ("2", "-"), ("3", "-"), ("4", "-")]),
        );

        assert_eq!(dispatch_count(&actions), 2);
        assert!(!router.budget_left());

        // A further search page contributes nothing once the budget is gone
        let actions = search_completion(&mut router, &search_body(&[("9", "-")]));
        assert!(actions.is_empty());
    }

    #[test]
    fn test_card_without_job_id_is_skipped() {
        let mut router = create_test_router(10, false, false);

        // "JOB - -" yields the bare base URL, which has no id segment
        let actions = search_completion(&mut router, "JOB - -\nJOB 7 -");

        let pushed = pushed_records(&actions);
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].id, "7");
    }
}

//! Crawl coordinator - the run loop
//!
//! Seeds the search frontier, keeps up to the configured number of fetches
//! in flight, and feeds each completion through the router one at a time.
//! Routing is the only place shared crawl state is touched, so the single
//! loop body gives the serialized decision step the design depends on
//! without any locking.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchOutcome};
use crate::crawler::router::{FetchRequest, RouteAction, Router};
use crate::crawler::scheduler::Scheduler;
use crate::output::{JsonLinesSink, ResultSink, RunSummary};
use crate::parse::{HtmlParser, PageParser};
use crate::url::{build_search_pages, shard_by_location, to_canonical_fetch_form};
use crate::SweepError;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use url::Url;

/// A fetch that finished, back with the request that produced it
struct Completion {
    request: FetchRequest,
    outcome: FetchOutcome,
}

/// Main crawl coordinator
pub struct Coordinator {
    config: Arc<Config>,
    scheduler: Scheduler,
    router: Router,
    sink: Box<dyn ResultSink>,
    base_url: Url,
    sharded: bool,
    seeded_urls: usize,
}

impl Coordinator {
    /// Creates a coordinator with the default HTML parser and JSON-lines sink
    pub fn new(config: Config) -> Result<Self, SweepError> {
        let sink = JsonLinesSink::new(
            Path::new(&config.output.records_path),
            Path::new(&config.output.summary_path),
        )?;
        Self::with_parts(config, Arc::new(HtmlParser::default()), Box::new(sink))
    }

    /// Creates a coordinator with injected parser and sink
    pub fn with_parts(
        config: Config,
        parser: Arc<dyn PageParser>,
        sink: Box<dyn ResultSink>,
    ) -> Result<Self, SweepError> {
        let base_url = Url::parse(&config.crawler.base_url)?;
        let scheduler = Scheduler::new(Duration::from_millis(
            config.crawler.min_dispatch_interval_ms,
        ));
        let router = Router::new(&config, base_url.clone(), parser);

        Ok(Self {
            config: Arc::new(config),
            scheduler,
            router,
            sink,
            base_url,
            sharded: false,
            seeded_urls: 0,
        })
    }

    /// Runs the crawl to completion
    ///
    /// Terminates once the frontier is exhausted (or the budget is reached)
    /// and all in-flight work has drained. Per-page scraping failures never
    /// fail the run; only sink I/O errors propagate.
    pub async fn run(&mut self) -> Result<RunSummary, SweepError> {
        self.seed();

        let concurrency = self.config.crawler.max_concurrent_fetches as usize;
        let (tx, mut rx) = mpsc::channel::<Completion>(concurrency.max(1) * 2);
        let mut in_flight = 0usize;
        let mut last_logged = 0usize;
        let start_time = Instant::now();

        loop {
            // Keep the worker pool full with whatever is ready to dispatch
            while in_flight < concurrency {
                match self.scheduler.pop_ready(Instant::now()) {
                    Some(request) => {
                        in_flight += 1;
                        spawn_fetch(request, tx.clone());
                    }
                    None => break,
                }
            }

            if in_flight == 0 {
                if self.scheduler.is_empty() {
                    break;
                }
                // Everything queued is backing off or gated; sleep it out
                let wait = self
                    .scheduler
                    .time_until_ready(Instant::now())
                    .unwrap_or(Duration::from_millis(100));
                tokio::time::sleep(wait.max(Duration::from_millis(10))).await;
                continue;
            }

            let Some(completion) = rx.recv().await else {
                break;
            };
            in_flight -= 1;

            let actions = self.router.route(completion.request, completion.outcome);
            for action in actions {
                match action {
                    RouteAction::Push(record) => self.sink.push(&record)?,
                    RouteAction::Dispatch { request, delay } => {
                        let not_before = delay.map(|d| Instant::now() + d);
                        self.scheduler.push_delayed(request, not_before);
                    }
                    RouteAction::CoolDown(duration) => self.scheduler.apply_cooldown(duration),
                }
            }

            // Once the budget is reached, pagination stops; queued detail
            // and company work still drains.
            if !self.router.budget_left() {
                self.scheduler.drop_searches();
            }

            let pushed = self.router.pushed();
            if pushed > last_logged && pushed % 25 == 0 {
                last_logged = pushed;
                tracing::info!(
                    "Progress: {} records pushed, {} queued, {} in flight, {:.0}s elapsed",
                    pushed,
                    self.scheduler.len(),
                    in_flight,
                    start_time.elapsed().as_secs_f64()
                );
            }
        }

        let summary = RunSummary {
            pushed: self.router.pushed(),
            start_urls: self.seeded_urls,
            keywords: self.config.search.keywords.len(),
            sharded: self.sharded,
            finished_at: chrono::Utc::now(),
        };
        self.sink.finalize(&summary)?;

        tracing::info!(
            "Run complete: {} records in {:?}",
            summary.pushed,
            start_time.elapsed()
        );

        Ok(summary)
    }

    /// Seeds the frontier from start URLs and keyword searches
    ///
    /// Each search page's URL is its identity; a URL that two seeding paths
    /// both produce is queued only once.
    fn seed(&mut self) {
        let search = self.config.search.clone();
        let mut seeded: HashSet<String> = HashSet::new();

        for raw in &search.start_urls {
            match to_canonical_fetch_form(raw) {
                Ok(url) => {
                    if !seeded.insert(url.to_string()) {
                        continue;
                    }
                    let offset = url
                        .query_pairs()
                        .find(|(k, _)| k == "start")
                        .and_then(|(_, v)| v.parse().ok())
                        .unwrap_or(0);
                    let request = self.router.search_request(url, offset);
                    self.scheduler.push(request);
                    self.seeded_urls += 1;
                }
                Err(e) => {
                    // A bad entry among several start URLs must not abort the run
                    tracing::warn!("Skipping malformed start URL '{}': {}", raw, e);
                }
            }
        }

        for keyword in &search.keywords {
            let shards = search
                .target_country
                .as_deref()
                .filter(|_| search.split_by_location)
                .and_then(|country| shard_by_location(keyword, country));

            match shards {
                Some(shards) => {
                    self.sharded = true;
                    for shard in shards {
                        tracing::info!("Seeding shard: {}", shard.label);
                        self.seed_search(keyword, &shard.location, &mut seeded);
                    }
                }
                None => {
                    self.seed_search(keyword, &search.location, &mut seeded);
                }
            }
        }

        tracing::info!(
            "Seeded {} search pages ({} start URLs, {} keywords)",
            self.scheduler.len(),
            self.seeded_urls,
            search.keywords.len()
        );
    }

    fn seed_search(&mut self, keywords: &str, location: &str, seeded: &mut HashSet<String>) {
        let pages = build_search_pages(
            &self.base_url,
            keywords,
            location,
            self.config.search.date_posted.as_deref(),
            self.config.search.max_items,
        );
        for page in pages {
            if !seeded.insert(page.url.to_string()) {
                continue;
            }
            let request = self.router.search_request(page.url, page.offset);
            self.scheduler.push(request);
        }
    }
}

fn spawn_fetch(request: FetchRequest, tx: mpsc::Sender<Completion>) {
    tokio::spawn(async move {
        let outcome = match build_http_client(&request.identity) {
            Ok(client) => fetch_url(&client, request.url.as_str()).await,
            Err(e) => FetchOutcome::NetworkError {
                error: e.to_string(),
            },
        };
        let _ = tx.send(Completion { request, outcome }).await;
    });
}

/// Runs a complete scrape with the default parser and sink
pub async fn run_scrape(config: Config) -> Result<RunSummary, SweepError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}

//! Dispatch scheduler: priority frontier, backoff, and politeness spacing
//!
//! The frontier is a priority queue of fetch requests. Job-detail and
//! company fetches outrank further search pagination so a bounded worker
//! pool finishes in-flight jobs before expanding the frontier, which bounds
//! the growth of pending work under a tight result budget.

use crate::crawler::router::{FetchRequest, RequestKind};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Priority for job-detail and company fetches (dispatched first)
const PRIORITY_JOB: u32 = 0;

/// Priority for search pagination
const PRIORITY_SEARCH: u32 = 10;

/// A fetch request queued with priority and optional backoff deadline
#[derive(Debug)]
struct QueuedFetch {
    request: FetchRequest,
    priority: u32,
    /// Earliest instant this request may be dispatched (retry backoff)
    not_before: Option<Instant>,
    /// Insertion order, for FIFO behavior within a priority class
    seq: u64,
}

// Lower priority values are popped first from the BinaryHeap; ties go to
// the earliest-queued request.
impl Ord for QueuedFetch {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedFetch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedFetch {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueuedFetch {}

/// Scheduler manages the frontier queue, backoff deadlines, and the
/// per-site politeness delay between consecutive dispatches
#[derive(Debug)]
pub struct Scheduler {
    frontier: BinaryHeap<QueuedFetch>,
    next_seq: u64,
    /// Global pause after a rate-limited search page
    cooldown_until: Option<Instant>,
    /// Earliest instant the next dispatch may happen (politeness spacing)
    next_dispatch_at: Option<Instant>,
    min_dispatch_interval: Duration,
}

impl Scheduler {
    pub fn new(min_dispatch_interval: Duration) -> Self {
        Self {
            frontier: BinaryHeap::new(),
            next_seq: 0,
            cooldown_until: None,
            next_dispatch_at: None,
            min_dispatch_interval,
        }
    }

    /// Queues a request for dispatch
    pub fn push(&mut self, request: FetchRequest) {
        self.push_delayed(request, None);
    }

    /// Queues a request that may not be dispatched before `not_before`
    pub fn push_delayed(&mut self, request: FetchRequest, not_before: Option<Instant>) {
        let priority = match request.kind {
            RequestKind::Search { .. } => PRIORITY_SEARCH,
            RequestKind::JobDetail { .. } | RequestKind::Company { .. } => PRIORITY_JOB,
        };

        self.frontier.push(QueuedFetch {
            request,
            priority,
            not_before,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Pops the highest-priority request that is ready at `now`
    ///
    /// Returns None when the frontier is empty, every queued request is
    /// still backing off, or a global gate (cooldown, politeness spacing)
    /// is closed.
    pub fn pop_ready(&mut self, now: Instant) -> Option<FetchRequest> {
        if self.gate_closed(now) {
            return None;
        }

        // Pop in priority order; backing-off entries are set aside and
        // pushed back once a ready one is found (or the heap is exhausted).
        let mut not_ready = Vec::new();
        let mut found = None;

        while let Some(queued) = self.frontier.pop() {
            let ready = queued.not_before.map_or(true, |deadline| deadline <= now);
            if ready {
                found = Some(queued.request);
                break;
            }
            not_ready.push(queued);
        }

        for queued in not_ready {
            self.frontier.push(queued);
        }

        if found.is_some() {
            self.next_dispatch_at = Some(now + self.min_dispatch_interval);
        }

        found
    }

    /// Minimum time to wait before `pop_ready` can yield something
    ///
    /// Returns None when the frontier is empty.
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        if self.frontier.is_empty() {
            return None;
        }

        let earliest_entry = self
            .frontier
            .iter()
            .map(|queued| queued.not_before.unwrap_or(now))
            .min()
            .unwrap_or(now);

        let mut ready_at = earliest_entry;
        if let Some(cooldown) = self.cooldown_until {
            ready_at = ready_at.max(cooldown);
        }
        if let Some(spacing) = self.next_dispatch_at {
            ready_at = ready_at.max(spacing);
        }

        Some(ready_at.saturating_duration_since(now))
    }

    /// Pauses all dispatching for `duration` from now
    ///
    /// Used for the search rate-limit leniency: the rate-limited page is
    /// dropped and the whole frontier cools off briefly.
    pub fn apply_cooldown(&mut self, duration: Duration) {
        let until = Instant::now() + duration;
        self.cooldown_until = Some(match self.cooldown_until {
            Some(existing) => existing.max(until),
            None => until,
        });
    }

    /// Drops every queued search request, keeping detail/company work
    ///
    /// Called once the dispatch budget is reached: pagination stops, but
    /// queued fetches that serve already-dispatched jobs must still run.
    pub fn drop_searches(&mut self) {
        self.frontier
            .retain(|queued| !matches!(queued.request.kind, RequestKind::Search { .. }));
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frontier.len()
    }

    fn gate_closed(&self, now: Instant) -> bool {
        if let Some(until) = self.cooldown_until {
            if until > now {
                return true;
            }
        }
        if let Some(at) = self.next_dispatch_at {
            if at > now {
                return true;
            }
        }
        false
    }
}

use crate::record::{CompanyFields, CompanyKey, JobRecord};
use std::collections::HashMap;

/// Per-company cache entry
///
/// Created in-flight the first time any job references the key, resolved
/// exactly once by whichever fetch of that company's page terminates, and
/// never re-opened afterward within a run. The pending list holds every job
/// awaiting the resolution, first passenger included.
#[derive(Debug)]
enum CacheEntry {
    InFlight { pending: Vec<JobRecord> },
    Resolved(Option<CompanyFields>),
}

/// Result of a join decision for one job
#[derive(Debug)]
pub enum JoinOutcome {
    /// Entry already resolved; the job comes back with fields to merge
    Resolved {
        job: JobRecord,
        fields: Option<CompanyFields>,
    },
    /// First reference to this key: exactly one fetch must be dispatched.
    /// The job is parked in the pending list until resolution.
    FetchNeeded,
    /// A fetch is already in flight; the job is parked behind it
    Parked,
}

/// Company cache plus pending-join table
///
/// Guarantees at most one company fetch per key per run, with fan-out to
/// every job that referenced the key while the fetch was outstanding.
#[derive(Debug, Default)]
pub struct CompanyCache {
    entries: HashMap<CompanyKey, CacheEntry>,
}

impl CompanyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides how `job` joins to `key`
    ///
    /// Exactly one caller per key ever sees `FetchNeeded`; concurrent
    /// references are parked, later references after resolution get the
    /// cached fields immediately.
    pub fn join(&mut self, key: CompanyKey, job: JobRecord) -> JoinOutcome {
        match self.entries.get_mut(&key) {
            None => {
                self.entries.insert(
                    key,
                    CacheEntry::InFlight {
                        pending: vec![job],
                    },
                );
                JoinOutcome::FetchNeeded
            }
            Some(CacheEntry::InFlight { pending }) => {
                pending.push(job);
                JoinOutcome::Parked
            }
            Some(CacheEntry::Resolved(fields)) => JoinOutcome::Resolved {
                job,
                fields: fields.clone(),
            },
        }
    }

    /// Resolves the entry for `key` and drains its pending list
    ///
    /// `fields` is Some on success and None for the permanent-failure
    /// tombstone; either way the entry stays resolved for the rest of the
    /// run. Resolving an already-resolved key is a no-op that drains
    /// nothing.
    pub fn resolve(
        &mut self,
        key: &CompanyKey,
        fields: Option<CompanyFields>,
    ) -> Vec<JobRecord> {
        match self.entries.get_mut(key) {
            Some(entry) => {
                if matches!(entry, CacheEntry::Resolved(_)) {
                    tracing::warn!("Company {} resolved twice; ignoring", key);
                    return Vec::new();
                }
                match std::mem::replace(entry, CacheEntry::Resolved(fields)) {
                    CacheEntry::InFlight { pending } => pending,
                    CacheEntry::Resolved(_) => Vec::new(),
                }
            }
            None => {
                tracing::warn!("Company {} resolved without a cache entry", key);
                Vec::new()
            }
        }
    }

    /// Whether a fetch is currently outstanding for `key`
    pub fn is_in_flight(&self, key: &CompanyKey) -> bool {
        matches!(self.entries.get(key), Some(CacheEntry::InFlight { .. }))
    }

    /// Total number of jobs parked across all pending lists
    pub fn parked_jobs(&self) -> usize {
        self.entries
            .values()
            .map(|entry| match entry {
                CacheEntry::InFlight { pending } => pending.len(),
                CacheEntry::Resolved(_) => 0,
            })
            .sum()
    }
}

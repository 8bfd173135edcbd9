use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use parking_lot::RwLock;

use crate::entities::github::RepoSummary;

#[derive(Debug, Clone)]
struct Snapshot {
    repos: Arc<Vec<RepoSummary>>,
    stored_at: Instant,
    ticket: u64,
}

/// Last good GitHub listing. Every fetch takes a ticket before it starts; a
/// finished fetch only replaces the snapshot when its ticket is newer than the
/// one already stored, so a slow response can never overwrite a fresher one.
#[derive(Debug)]
pub struct RepoCache {
    ttl: Duration,
    next_ticket: AtomicU64,
    snapshot: RwLock<Option<Snapshot>>,
}

impl RepoCache {
    pub fn new(ttl: Duration) -> Self {
        RepoCache {
            ttl,
            next_ticket: AtomicU64::new(0),
            snapshot: RwLock::new(None),
        }
    }

    pub fn issue_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The cached listing if it is still within its TTL.
    pub fn fresh(&self) -> Option<Arc<Vec<RepoSummary>>> {
        self.snapshot
            .read()
            .as_ref()
            .filter(|s| s.stored_at.elapsed() < self.ttl)
            .map(|s| s.repos.clone())
    }

    /// The cached listing regardless of age.
    pub fn stale(&self) -> Option<Arc<Vec<RepoSummary>>> {
        self.snapshot.read().as_ref().map(|s| s.repos.clone())
    }

    /// Returns `false` when a newer ticket already stored its result.
    pub fn store(&self, ticket: u64, repos: Vec<RepoSummary>) -> bool {
        let mut guard = self.snapshot.write();
        if guard.as_ref().is_some_and(|s| s.ticket >= ticket) {
            return false;
        }
        *guard = Some(Snapshot {
            repos: Arc::new(repos),
            stored_at: Instant::now(),
            ticket,
        });
        true
    }

    pub fn age(&self) -> Option<Duration> {
        self.snapshot.read().as_ref().map(|s| s.stored_at.elapsed())
    }
}

/// Exponential backoff for the background refresh loop.
#[derive(Debug, Clone)]
pub struct RefreshBackoff {
    base: Duration,
    max: Duration,
    failures: u32,
}

impl RefreshBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        RefreshBackoff { base, max, failures: 0 }
    }

    /// `min(base * 2^failures, max)`
    pub fn next_delay(&self) -> Duration {
        let factor = 1u32.checked_shl(self.failures).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
    }

    pub fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

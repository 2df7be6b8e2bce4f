//! Nullable uniqueness service: in-memory consumption map.

use async_trait::async_trait;
use badge_store::{CommitOutcome, StoreError, UniquenessService};
use badge_types::{TxHash, VersionRef};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// An in-memory uniqueness service.
///
/// Commits are atomic under a single lock. Tests can hold the first `n`
/// commit attempts until all `n` have arrived, which forces concurrent
/// flows to race on the same input.
pub struct NullNotary {
    consumed: Mutex<HashMap<VersionRef, TxHash>>,
    committed: Mutex<HashSet<TxHash>>,
    hold: Mutex<Option<(Arc<Barrier>, usize)>>,
    unavailable: AtomicBool,
    attempts: AtomicUsize,
    accepted: AtomicUsize,
}

impl NullNotary {
    pub fn new() -> Self {
        Self {
            consumed: Mutex::new(HashMap::new()),
            committed: Mutex::new(HashSet::new()),
            hold: Mutex::new(None),
            unavailable: AtomicBool::new(false),
            attempts: AtomicUsize::new(0),
            accepted: AtomicUsize::new(0),
        }
    }

    /// Hold the next `n` commit attempts until all of them have arrived.
    pub fn hold_until(&self, n: usize) {
        *self.hold.lock().unwrap() = Some((Arc::new(Barrier::new(n)), n));
    }

    /// Make every commit fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// The transition that consumed `version`, if any.
    pub fn consumed_by(&self, version: &VersionRef) -> Option<TxHash> {
        self.consumed.lock().unwrap().get(version).copied()
    }

    /// Number of `try_commit` calls seen so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of commits that returned [`CommitOutcome::Accepted`].
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    fn take_hold(&self) -> Option<Arc<Barrier>> {
        let mut hold = self.hold.lock().unwrap();
        let (barrier, remaining) = hold.as_mut()?;
        let barrier = Arc::clone(barrier);
        *remaining -= 1;
        if *remaining == 0 {
            *hold = None;
        }
        Some(barrier)
    }
}

impl Default for NullNotary {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UniquenessService for NullNotary {
    async fn try_commit(
        &self,
        consumed: &BTreeSet<VersionRef>,
        new_version: VersionRef,
    ) -> Result<CommitOutcome, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = self.take_hold() {
            barrier.wait().await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("null notary switched off".into()));
        }

        let tx_id = new_version.tx_id;
        let mut spent = self.consumed.lock().unwrap();
        let mut conflicts = Vec::new();
        let mut consumed_by = None;
        for version in consumed {
            match spent.get(version) {
                Some(by) if *by != tx_id => {
                    conflicts.push(*version);
                    consumed_by.get_or_insert(*by);
                }
                _ => {}
            }
        }
        if let Some(consumed_by) = consumed_by {
            return Ok(CommitOutcome::DoubleSpend {
                conflicts,
                consumed_by,
            });
        }
        for version in consumed {
            spent.insert(*version, tx_id);
        }
        self.committed.lock().unwrap().insert(tx_id);
        self.accepted.fetch_add(1, Ordering::SeqCst);
        Ok(CommitOutcome::Accepted { tx_id })
    }

    async fn is_committed(&self, tx_id: &TxHash) -> Result<bool, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("null notary switched off".into()));
        }
        Ok(self.committed.lock().unwrap().contains(tx_id))
    }
}

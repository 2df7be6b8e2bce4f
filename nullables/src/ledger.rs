//! Nullable ledger: thread-safe in-memory record store.

use badge_contracts::RecordVersion;
use badge_store::{Ledger, StoreError};
use badge_types::RecordId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory ledger keeping every recorded version per badge.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullLedger {
    versions: Mutex<HashMap<RecordId, Vec<RecordVersion>>>,
    failing: AtomicBool,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            versions: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every write fail with a backend error. Reads still work.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of distinct badges known.
    pub fn record_count(&self) -> usize {
        self.versions.lock().unwrap().len()
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger for NullLedger {
    fn get_current(&self, id: &RecordId) -> Result<Option<RecordVersion>, StoreError> {
        Ok(self
            .versions
            .lock()
            .unwrap()
            .get(id)
            .and_then(|history| history.last().cloned()))
    }

    fn record_finalized(&self, id: &RecordId, version: RecordVersion) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null ledger write failure".into()));
        }
        let mut versions = self.versions.lock().unwrap();
        let history = versions.entry(*id).or_default();
        // the same notice may arrive over more than one session
        if history.iter().any(|v| v.version == version.version) {
            return Ok(());
        }
        history.push(version);
        Ok(())
    }

    fn history(&self, id: &RecordId) -> Result<Vec<RecordVersion>, StoreError> {
        Ok(self
            .versions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default())
    }
}

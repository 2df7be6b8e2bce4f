//! Local ledger trait.

use crate::StoreError;
use badge_contracts::RecordVersion;
use badge_types::RecordId;

/// A node's view of finalized badge versions.
///
/// Only the newest recorded version of a badge is current. The ledger does
/// not enforce any contract rule and does not detect double spends; that is
/// the uniqueness service's job.
pub trait Ledger: Send + Sync {
    /// The current version of a badge, if this node knows it.
    fn get_current(&self, id: &RecordId) -> Result<Option<RecordVersion>, StoreError>;

    /// Record a newly finalized version, making it current.
    fn record_finalized(&self, id: &RecordId, version: RecordVersion) -> Result<(), StoreError>;

    /// Every version recorded for a badge, oldest first.
    fn history(&self, id: &RecordId) -> Result<Vec<RecordVersion>, StoreError>;

    /// Whether this node knows the badge at all.
    fn contains(&self, id: &RecordId) -> Result<bool, StoreError> {
        self.get_current(id).map(|current| current.is_some())
    }
}

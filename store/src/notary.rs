//! Uniqueness service trait.

use crate::StoreError;
use async_trait::async_trait;
use badge_types::{TxHash, VersionRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Result of asking the uniqueness service to commit a transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitOutcome {
    /// None of the inputs had been consumed; they now are, by `tx_id`.
    Accepted { tx_id: TxHash },
    /// At least one input was consumed earlier by another transition.
    DoubleSpend {
        conflicts: Vec<VersionRef>,
        consumed_by: TxHash,
    },
}

/// The single serialization point for consumption of record versions.
///
/// `try_commit` must be atomic: it either marks every consumed version as
/// spent by `new_version.tx_id` or marks none. Committing the same
/// transition again is accepted again.
#[async_trait]
pub trait UniquenessService: Send + Sync {
    async fn try_commit(
        &self,
        consumed: &BTreeSet<VersionRef>,
        new_version: VersionRef,
    ) -> Result<CommitOutcome, StoreError>;

    /// Whether `tx_id` was accepted by an earlier `try_commit`.
    ///
    /// Parties receiving a finality notice ask this instead of trusting the
    /// sender's word that the transition is final.
    async fn is_committed(&self, tx_id: &TxHash) -> Result<bool, StoreError>;
}

//! What a successful invocation hands back to its caller.

use crate::FinalityOutcome;
use badge_contracts::BadgeRecord;
use badge_types::{PartyName, RecordId, TxHash};
use std::fmt;

/// A finalized issue or show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_id: TxHash,
    /// The badge version that is now current.
    pub record: BadgeRecord,
    /// Human-readable summary.
    pub message: String,
    /// Parties that have not acknowledged the result yet.
    pub undelivered: Vec<PartyName>,
    /// Badges whose final version is missing from the local ledger.
    pub unrecorded: Vec<RecordId>,
}

impl Confirmation {
    pub fn issued(record: BadgeRecord, outcome: FinalityOutcome) -> Self {
        let message = format!(
            "{} Badge (ID: {}) issued to {} txID: {}",
            record.name, record.id, record.holder, outcome.tx_id
        );
        Self {
            tx_id: outcome.tx_id,
            record,
            message,
            undelivered: outcome.undelivered,
            unrecorded: outcome.unrecorded,
        }
    }

    pub fn shown(record: BadgeRecord, outcome: FinalityOutcome) -> Self {
        let message = format!(
            "The {} badge has {} times left to show!",
            record.name, record.remaining_uses
        );
        Self {
            tx_id: outcome.tx_id,
            record,
            message,
            undelivered: outcome.undelivered,
            unrecorded: outcome.unrecorded,
        }
    }
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

//! The badge record: one version of a linear entity.

use badge_types::{Party, RecordId, VersionRef};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single version of a badge.
///
/// Everything except `remaining_uses` is fixed when the badge is issued and
/// must be carried over unchanged by every later version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeRecord {
    /// Display label, never empty.
    pub name: String,
    pub id: RecordId,
    pub issued_on: NaiveDate,
    /// The party that created the badge; must be the issuing authority.
    pub issuer: Party,
    /// The party entitled to show the badge.
    pub holder: Party,
    pub description: String,
    /// How many more times the badge may be shown.
    pub remaining_uses: u32,
    /// Parties whose consent is needed to consume this version.
    pub participants: BTreeSet<Party>,
}

impl BadgeRecord {
    /// Build the root version of a new badge. Participants default to `{holder}`.
    pub fn new(
        name: impl Into<String>,
        id: RecordId,
        issued_on: NaiveDate,
        issuer: Party,
        holder: Party,
        description: impl Into<String>,
        remaining_uses: u32,
    ) -> Self {
        let participants = BTreeSet::from([holder.clone()]);
        Self {
            name: name.into(),
            id,
            issued_on,
            issuer,
            holder,
            description: description.into(),
            remaining_uses,
            participants,
        }
    }

    /// The next version after one use, or `None` once the badge is exhausted.
    pub fn after_one_use(&self) -> Option<Self> {
        let remaining_uses = self.remaining_uses.checked_sub(1)?;
        Some(Self {
            remaining_uses,
            ..self.clone()
        })
    }

    /// Whether `party` must consent to consuming this version.
    pub fn is_participant(&self, party: &Party) -> bool {
        self.participants.contains(party)
    }
}

/// A finalized record version together with the reference that locates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordVersion {
    pub record: BadgeRecord,
    pub version: VersionRef,
}

impl RecordVersion {
    pub fn new(record: BadgeRecord, version: VersionRef) -> Self {
        Self { record, version }
    }
}

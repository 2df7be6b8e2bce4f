//! Proposed replacements of record versions.

use crate::{BadgeRecord, Command, RecordVersion};
use badge_crypto::hash_transaction;
use badge_types::{Party, TxHash, VersionRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A transition consumes zero or more current versions and produces new ones.
///
/// Its id is the Blake2b hash of the bincode encoding, so every field
/// (including the random `salt`) is covered by the signatures over it. The
/// salt keeps two otherwise identical proposals, such as two concurrent uses
/// of the same badge, from sharing an id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub inputs: Vec<RecordVersion>,
    pub outputs: Vec<BadgeRecord>,
    pub commands: Vec<Command>,
    /// Parties whose signatures are required before the transition can finalize.
    pub required_signers: BTreeSet<Party>,
    /// Parties told about the result without being asked to sign.
    pub observers: BTreeSet<Party>,
    pub salt: [u8; 32],
}

impl Transition {
    /// The transaction id of this transition.
    pub fn id(&self) -> TxHash {
        let bytes = bincode::serialize(self).expect("Transition is always serializable");
        hash_transaction(&bytes)
    }

    /// References of every input version this transition consumes.
    pub fn consumed(&self) -> BTreeSet<VersionRef> {
        self.inputs.iter().map(|input| input.version).collect()
    }

    /// Outputs paired with the references they will have once finalized.
    pub fn finalized_outputs(&self) -> Vec<RecordVersion> {
        let tx_id = self.id();
        self.outputs
            .iter()
            .enumerate()
            .map(|(index, record)| RecordVersion::new(record.clone(), VersionRef::new(tx_id, index as u32)))
            .collect()
    }

    /// Everybody who needs to learn about finality: signers, output
    /// participants and observers, minus `us`.
    pub fn recipients(&self, us: &Party) -> BTreeSet<Party> {
        self.required_signers
            .iter()
            .chain(self.outputs.iter().flat_map(|o| o.participants.iter()))
            .chain(self.observers.iter())
            .filter(|party| *party != us)
            .cloned()
            .collect()
    }

    /// The single command, if there is exactly one.
    pub fn command(&self) -> Option<Command> {
        match self.commands.as_slice() {
            [command] => Some(*command),
            _ => None,
        }
    }
}

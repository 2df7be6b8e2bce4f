//! References to individual record versions.

use crate::TxHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points at one output of one finalized transition.
///
/// A version is consumed when a later transition lists its reference as an
/// input; the uniqueness service allows that to happen at most once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionRef {
    pub tx_id: TxHash,
    pub index: u32,
}

impl VersionRef {
    pub fn new(tx_id: TxHash, index: u32) -> Self {
        Self { tx_id, index }
    }
}

impl fmt::Display for VersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.tx_id, self.index)
    }
}

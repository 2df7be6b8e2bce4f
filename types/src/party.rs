//! Party identities.
//!
//! A party is known to the rest of the network by an X.500-style display name
//! (e.g. `O=IssuerNode, L=London, C=GB`) and authenticates with an Ed25519 key.

use crate::{PublicKey, TypeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The well-known name of a party.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartyName(String);

impl PartyName {
    /// Create a party name, rejecting blank input.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypeError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(TypeError::EmptyPartyName);
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PartyName {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A network participant: a name bound to a verification key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Party {
    pub name: PartyName,
    pub key: PublicKey,
}

impl Party {
    pub fn new(name: PartyName, key: PublicKey) -> Self {
        Self { name, key }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

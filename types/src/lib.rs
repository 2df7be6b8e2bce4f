//! Fundamental types for the badge ledger.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! party identities, signing keys, transaction hashes, record identifiers,
//! references to individual record versions, and the calendar source.

pub mod clock;
pub mod error;
pub mod hash;
pub mod keys;
pub mod party;
pub mod record_id;
pub mod version;

pub use clock::{Clock, SystemClock};
pub use error::TypeError;
pub use hash::TxHash;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use party::{Party, PartyName};
pub use record_id::RecordId;
pub use version::VersionRef;

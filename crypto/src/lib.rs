//! Cryptographic primitives for the badge ledger.
//!
//! - **Ed25519** for signing transition ids and verifying counterparty approvals
//! - **Blake2b-256** for hashing encoded transitions into transaction ids
//! - [`SigningService`], the seam through which flows obtain signatures

pub mod hash;
pub mod keys;
pub mod sign;
pub mod signer;

pub use hash::{blake2b_256, hash_transaction};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
pub use signer::{LocalSigner, SigningService};

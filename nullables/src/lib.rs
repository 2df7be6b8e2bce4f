//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator the agreement flows talk to (clock, ledger, uniqueness
//! service, network) is a trait. This crate provides in-memory
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (unreachable parties, held commits)
//! - Never touch the filesystem or a real network
//!
//! Usage: swap real implementations for nullables in tests, or wire several
//! parties together in one process.

pub mod clock;
pub mod ledger;
pub mod network;
pub mod notary;

pub use clock::NullClock;
pub use ledger::NullLedger;
pub use network::{NullNetwork, NullNetworkHandle, NullSession};
pub use notary::NullNotary;

//! Storage-side collaborator traits.
//!
//! - [`Ledger`]: a node's local view of finalized badge versions
//! - [`UniquenessService`]: the notary that lets each version be consumed once
//!
//! Backends (in-memory for tests, anything durable in production) implement
//! these traits; the agreement flows depend only on the traits.

pub mod error;
pub mod ledger;
pub mod notary;

pub use error::StoreError;
pub use ledger::Ledger;
pub use notary::{CommitOutcome, UniquenessService};

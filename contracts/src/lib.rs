//! Badge records and the rules for replacing them.
//!
//! - [`BadgeRecord`]: one version of a badge; [`RecordVersion`] pairs it with
//!   the reference of the transition output that produced it
//! - [`Command`]: the closed set of things a transition can do (`Issue`, `Show`)
//! - [`Transition`]: inputs consumed, outputs produced, command, signers
//! - [`SignedTransition`]: a transition plus the signatures collected so far
//! - [`BadgeContract`]: the pure validator every party runs independently

pub mod command;
pub mod contract;
pub mod error;
pub mod record;
pub mod signed;
pub mod transition;

pub use command::Command;
pub use contract::{BadgeContract, DEFAULT_ISSUING_AUTHORITY};
pub use error::{ContractViolation, SignatureError};
pub use record::{BadgeRecord, RecordVersion};
pub use signed::{SignedTransition, TransitionSignature};
pub use transition::Transition;

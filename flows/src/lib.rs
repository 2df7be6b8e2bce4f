//! The agreement protocols that issue and update badges.
//!
//! Every invocation walks the same pipeline:
//!
//! 1. [`ProposalBuilder`] turns caller intent into a [`Transition`](badge_contracts::Transition)
//! 2. the local [`BadgeContract`](badge_contracts::BadgeContract) checks it before any session opens
//! 3. [`SignatureCollector`] gathers approvals from the other required signers
//! 4. [`FinalityCommitter`] asks the uniqueness service to accept it and tells
//!    every interested party
//!
//! [`IssueProtocol`] and [`ShowProtocol`] compose those steps; [`Responder`]
//! is the counterparty side that reviews signature requests and records
//! finality notices.

pub mod builder;
pub mod collector;
pub mod confirmation;
pub mod error;
pub mod finality;
pub mod issue;
pub mod responder;
pub mod services;
pub mod show;

pub use builder::{IssueIntent, ProposalBuilder};
pub use collector::{CollectedSignatures, CollectionState, SignatureCollector};
pub use confirmation::Confirmation;
pub use error::ProtocolError;
pub use finality::{FinalityCommitter, FinalityOutcome};
pub use issue::IssueProtocol;
pub use responder::{Responder, ServeSummary};
pub use services::{FlowServices, FlowTimeouts};
pub use show::ShowProtocol;

#[cfg(test)]
pub(crate) mod test_support;

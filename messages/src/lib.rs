//! Session message types for party-to-party communication.
//!
//! One session carries one conversation between an initiator and one
//! counterparty: an optional signature round trip followed by a finality
//! notice and its acknowledgement.

pub mod codec;
pub mod error;

pub use codec::{decode, encode, MAX_MESSAGE_SIZE, PROTOCOL_VERSION};
pub use error::CodecError;

use badge_contracts::{SignedTransition, TransitionSignature};
use badge_types::TxHash;
use serde::{Deserialize, Serialize};

/// Every message that can travel over a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowMessage {
    SignatureRequest(SignatureRequest),
    SignatureResponse(SignatureResponse),
    FinalityNotice(FinalityNotice),
    FinalityAck(FinalityAck),
}

impl FlowMessage {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SignatureRequest(_) => "signature_request",
            Self::SignatureResponse(_) => "signature_response",
            Self::FinalityNotice(_) => "finality_notice",
            Self::FinalityAck(_) => "finality_ack",
        }
    }
}

/// Ask a counterparty to sign a proposal.
///
/// The proposal already carries the initiator's own signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRequest {
    pub proposal: SignedTransition,
}

/// A counterparty's answer to a [`SignatureRequest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureResponse {
    Approved(TransitionSignature),
    Rejected(Refusal),
}

/// Why a counterparty would not sign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refusal {
    pub kind: RefusalKind,
    pub reason: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefusalKind {
    /// The proposal is wrong in itself; rebuilding it unchanged will not help.
    Invalid,
    /// The proposal consumes a version the counterparty no longer holds as
    /// current. Re-read the badge and build again.
    StaleInput,
}

impl Refusal {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            kind: RefusalKind::Invalid,
            reason: reason.into(),
        }
    }

    pub fn stale(reason: impl Into<String>) -> Self {
        Self {
            kind: RefusalKind::StaleInput,
            reason: reason.into(),
        }
    }
}

/// Tell a party that a transition has been accepted by the uniqueness service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalityNotice {
    pub finalized: SignedTransition,
    pub tx_id: TxHash,
}

/// Confirms that the recipient of a [`FinalityNotice`] recorded it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalityAck {
    pub tx_id: TxHash,
}

use badge_types::PartyName;
use thiserror::Error;

/// Why the contract refused a transition.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("malformed transition: {reason}")]
    MalformedTransition { reason: String },

    #[error("issuer {issuer} is not the issuing authority {authority}")]
    UnauthorizedIssuer {
        issuer: PartyName,
        authority: PartyName,
    },

    #[error("insufficient balance: input has {input} uses left, output claims {output}")]
    InsufficientBalance { input: u32, output: u32 },

    #[error("field `{field}` may not change between versions")]
    IllegalFieldMutation { field: &'static str },
}

impl ContractViolation {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedTransition {
            reason: reason.into(),
        }
    }
}

/// Problems with the signature set attached to a transition.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("invalid signature from {party}")]
    Invalid { party: PartyName },

    #[error("signature from {0} which is not a required signer")]
    Unexpected(String),

    #[error("missing signatures from: {}", .parties.join(", "))]
    Missing { parties: Vec<String> },
}

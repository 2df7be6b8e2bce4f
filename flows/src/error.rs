use badge_contracts::{ContractViolation, SignatureError};
use badge_network::SessionError;
use badge_store::StoreError;
use badge_types::{PartyName, RecordId, TxHash, VersionRef};
use thiserror::Error;

/// Everything that can stop an issue or show invocation.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The proposal itself is invalid; detected locally, never retried.
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("record {0} not found in the local ledger")]
    RecordNotFound(RecordId),

    /// No answer from a counterparty (unreachable, session error, timeout).
    #[error("signature collection from {party} failed: {cause}")]
    CollectionFailed { party: PartyName, cause: String },

    /// A counterparty explicitly refused to sign.
    #[error("rejected by {by}: {reason}")]
    Rejected { by: PartyName, reason: String },

    /// A counterparty's current version of an input differs from the one
    /// proposed; re-read the badge and rebuild.
    #[error("stale input at {party}: {reason}")]
    StaleInput { party: PartyName, reason: String },

    /// A finality notice for a transition the uniqueness service never accepted.
    #[error("transition {0} was not accepted by the uniqueness service")]
    NotFinal(TxHash),

    /// An input was already consumed; re-read the current version and rebuild.
    #[error("double spend: {} input(s) already consumed by {consumed_by}", .conflicts.len())]
    DoubleSpend {
        conflicts: Vec<VersionRef>,
        consumed_by: TxHash,
    },

    #[error("invalid signatures: {0}")]
    Signatures(#[from] SignatureError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ProtocolError {
    /// Infrastructure failures: nothing shared was mutated, so the caller may
    /// start the whole invocation again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CollectionFailed { .. } | Self::Session(_))
    }

    /// The caller's view of the badge is stale.
    pub fn requires_fresh_read(&self) -> bool {
        matches!(self, Self::DoubleSpend { .. } | Self::StaleInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_infrastructure_failures_are_retryable() {
        let party = PartyName::new("O=PartyA, L=Paris, C=FR").unwrap();
        assert!(ProtocolError::CollectionFailed {
            party: party.clone(),
            cause: "timed out".into()
        }
        .is_retryable());
        assert!(!ProtocolError::Rejected {
            by: party,
            reason: "no".into()
        }
        .is_retryable());
        assert!(!ProtocolError::Contract(ContractViolation::InsufficientBalance {
            input: 0,
            output: 0
        })
        .is_retryable());
    }

    #[test]
    fn double_spend_demands_fresh_read() {
        let err = ProtocolError::DoubleSpend {
            conflicts: vec![VersionRef::new(TxHash::ZERO, 0)],
            consumed_by: TxHash::new([1u8; 32]),
        };
        assert!(err.requires_fresh_read());
        assert!(!err.is_retryable());
        assert!(err.to_string().starts_with("double spend: 1 input(s)"));
    }

    #[test]
    fn stale_input_demands_fresh_read_not_retry() {
        let err = ProtocolError::StaleInput {
            party: PartyName::new("O=PartyA, L=Paris, C=FR").unwrap(),
            reason: "input is not current".into(),
        };
        assert!(err.requires_fresh_read());
        assert!(!err.is_retryable());
        assert!(!ProtocolError::InvalidParameters("bad".into()).requires_fresh_read());
    }
}

//! Turns caller intent into candidate transitions.

use crate::{FlowServices, ProtocolError};
use badge_contracts::{BadgeRecord, Command, ContractViolation, Transition};
use badge_types::{Party, RecordId};
use std::collections::BTreeSet;

/// Parameters for issuing a new badge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueIntent {
    pub name: String,
    pub holder: Party,
    pub description: String,
    /// Signed so that negative input can be reported instead of wrapping.
    pub starting_balance: i64,
}

/// Builds transitions from the local party's point of view.
pub struct ProposalBuilder<'a> {
    services: &'a FlowServices,
}

impl<'a> ProposalBuilder<'a> {
    pub fn new(services: &'a FlowServices) -> Self {
        Self { services }
    }

    /// A transition creating a new badge issued by us to `intent.holder`.
    ///
    /// Both issuer and holder must sign.
    pub fn issue(&self, intent: &IssueIntent) -> Result<Transition, ProtocolError> {
        if intent.name.trim().is_empty() {
            return Err(ProtocolError::InvalidParameters(
                "badge name must not be empty".into(),
            ));
        }
        if intent.starting_balance < 0 {
            return Err(ProtocolError::InvalidParameters(format!(
                "starting balance must not be negative, got {}",
                intent.starting_balance
            )));
        }
        let remaining_uses = u32::try_from(intent.starting_balance).map_err(|_| {
            ProtocolError::InvalidParameters(format!(
                "starting balance {} exceeds {}",
                intent.starting_balance,
                u32::MAX
            ))
        })?;

        let issuer = self.services.me.clone();
        let record = BadgeRecord::new(
            intent.name.clone(),
            RecordId::generate(),
            self.services.clock.today(),
            issuer.clone(),
            intent.holder.clone(),
            intent.description.clone(),
            remaining_uses,
        );

        Ok(Transition {
            inputs: Vec::new(),
            outputs: vec![record],
            commands: vec![Command::Issue],
            required_signers: BTreeSet::from([issuer, intent.holder.clone()]),
            observers: BTreeSet::new(),
            salt: rand::random(),
        })
    }

    /// A transition using the current version of badge `id` once.
    ///
    /// The badge's participants sign; the issuer is told about the result.
    pub fn show(&self, id: &RecordId) -> Result<Transition, ProtocolError> {
        let current = self
            .services
            .ledger
            .get_current(id)?
            .ok_or(ProtocolError::RecordNotFound(*id))?;

        if current.record.holder != self.services.me {
            return Err(ProtocolError::InvalidParameters(format!(
                "only the holder {} can show badge {}",
                current.record.holder, id
            )));
        }

        let output = current.record.after_one_use().ok_or(
            ContractViolation::InsufficientBalance {
                input: current.record.remaining_uses,
                output: 0,
            },
        )?;

        let required_signers = current.record.participants.clone();
        let observers = BTreeSet::from([current.record.issuer.clone()]);
        Ok(Transition {
            inputs: vec![current],
            outputs: vec![output],
            commands: vec![Command::Show],
            required_signers,
            observers,
            salt: rand::random(),
        })
    }
}

//! The badge contract: decides whether a proposed transition is valid.
//!
//! Verification is a pure function of the transition and the declared signer
//! set. Every party runs it for itself before signing or recording anything;
//! nobody relies on a counterparty's claim that a transition is valid.

use crate::{BadgeRecord, Command, ContractViolation, Transition};
use badge_types::{Party, PartyName};
use std::collections::BTreeSet;

/// The party allowed to issue badges unless configured otherwise.
pub const DEFAULT_ISSUING_AUTHORITY: &str = "O=IssuerNode, L=London, C=GB";

/// Validator for badge transitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BadgeContract {
    issuing_authority: PartyName,
}

impl BadgeContract {
    pub fn new(issuing_authority: PartyName) -> Self {
        Self { issuing_authority }
    }

    pub fn issuing_authority(&self) -> &PartyName {
        &self.issuing_authority
    }

    /// Verify `tx` against the signers declared on it.
    pub fn verify_transition(&self, tx: &Transition) -> Result<(), ContractViolation> {
        self.verify(tx, &tx.required_signers)
    }

    /// Verify a transition given the set of parties that must sign it.
    ///
    /// Checks run in a fixed order (command count, shape, authority or
    /// counter, carried-over fields, signers) so the same invalid transition
    /// always yields the same violation.
    pub fn verify(
        &self,
        tx: &Transition,
        signers: &BTreeSet<Party>,
    ) -> Result<(), ContractViolation> {
        let command = match tx.commands.as_slice() {
            [command] => *command,
            [] => return Err(ContractViolation::malformed("transition carries no command")),
            many => {
                return Err(ContractViolation::malformed(format!(
                    "expected exactly one command, found {}",
                    many.len()
                )))
            }
        };

        match command {
            Command::Issue => self.verify_issue(tx, signers),
            Command::Show => verify_show(tx, signers),
        }
    }

    fn verify_issue(
        &self,
        tx: &Transition,
        signers: &BTreeSet<Party>,
    ) -> Result<(), ContractViolation> {
        if !tx.inputs.is_empty() {
            return Err(ContractViolation::malformed(format!(
                "issue must not consume inputs, found {}",
                tx.inputs.len()
            )));
        }
        let [output] = tx.outputs.as_slice() else {
            return Err(ContractViolation::malformed(format!(
                "issue must produce exactly one output, found {}",
                tx.outputs.len()
            )));
        };
        if output.name.trim().is_empty() {
            return Err(ContractViolation::malformed("badge name must not be empty"));
        }
        if !output.is_participant(&output.holder) {
            return Err(ContractViolation::malformed(
                "holder must be a participant of the issued badge",
            ));
        }

        if output.issuer.name != self.issuing_authority {
            return Err(ContractViolation::UnauthorizedIssuer {
                issuer: output.issuer.name.clone(),
                authority: self.issuing_authority.clone(),
            });
        }

        if !signers.contains(&output.issuer) || !signers.contains(&output.holder) {
            return Err(ContractViolation::malformed(
                "issue must be signed by both issuer and holder",
            ));
        }
        Ok(())
    }
}

impl Default for BadgeContract {
    fn default() -> Self {
        Self::new(
            PartyName::new(DEFAULT_ISSUING_AUTHORITY)
                .expect("default issuing authority name is non-empty"),
        )
    }
}

fn verify_show(tx: &Transition, signers: &BTreeSet<Party>) -> Result<(), ContractViolation> {
    let [input] = tx.inputs.as_slice() else {
        return Err(ContractViolation::malformed(format!(
            "show must consume exactly one input, found {}",
            tx.inputs.len()
        )));
    };
    let [output] = tx.outputs.as_slice() else {
        return Err(ContractViolation::malformed(format!(
            "show must produce exactly one output, found {}",
            tx.outputs.len()
        )));
    };
    let input = &input.record;
    if input.id != output.id {
        return Err(ContractViolation::malformed(
            "show must keep the record identifier",
        ));
    }

    if input.remaining_uses == 0 || output.remaining_uses != input.remaining_uses - 1 {
        return Err(ContractViolation::InsufficientBalance {
            input: input.remaining_uses,
            output: output.remaining_uses,
        });
    }

    if let Some(field) = first_mutated_field(input, output) {
        return Err(ContractViolation::IllegalFieldMutation { field });
    }

    if !input.participants.iter().all(|p| signers.contains(p)) {
        return Err(ContractViolation::malformed(
            "show must be signed by every participant of the consumed badge",
        ));
    }
    Ok(())
}

/// The first field other than `remaining_uses` that differs.
fn first_mutated_field(input: &BadgeRecord, output: &BadgeRecord) -> Option<&'static str> {
    if input.name != output.name {
        Some("name")
    } else if input.issued_on != output.issued_on {
        Some("issued_on")
    } else if input.issuer != output.issuer {
        Some("issuer")
    } else if input.holder != output.holder {
        Some("holder")
    } else if input.description != output.description {
        Some("description")
    } else if input.participants != output.participants {
        Some("participants")
    } else {
        None
    }
}

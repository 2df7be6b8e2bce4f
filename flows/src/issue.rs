//! Issue a new badge: the issuing authority proposes, the holder co-signs.

use crate::{
    Confirmation, FinalityCommitter, FlowServices, IssueIntent, ProposalBuilder, ProtocolError,
    SignatureCollector,
};
use badge_contracts::ContractViolation;

pub struct IssueProtocol<'a> {
    services: &'a FlowServices,
}

impl<'a> IssueProtocol<'a> {
    pub fn new(services: &'a FlowServices) -> Self {
        Self { services }
    }

    /// Build, verify, collect the holder's signature, finalize.
    ///
    /// A contract violation is reported before any session is opened.
    pub async fn run(&self, intent: IssueIntent) -> Result<Confirmation, ProtocolError> {
        let tx = ProposalBuilder::new(self.services).issue(&intent)?;
        self.services.contract.verify_transition(&tx)?;
        let record = tx.outputs.first().cloned().ok_or_else(|| {
            ContractViolation::MalformedTransition {
                reason: "issue has no output".into(),
            }
        })?;
        tracing::debug!(record_id = %record.id, holder = %record.holder, "issue proposal verified");

        let collected = SignatureCollector::new(self.services, tx).collect().await?;
        let outcome = FinalityCommitter::new(self.services)
            .commit(collected.transition, collected.sessions)
            .await?;

        let confirmation = Confirmation::issued(record, outcome);
        tracing::info!(tx_id = %confirmation.tx_id, "{}", confirmation.message);
        Ok(confirmation)
    }
}

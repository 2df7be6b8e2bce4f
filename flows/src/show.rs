//! Use a badge once: the holder proposes, participants sign, the issuer is told.

use crate::{
    Confirmation, FinalityCommitter, FlowServices, ProposalBuilder, ProtocolError,
    SignatureCollector,
};
use badge_contracts::ContractViolation;
use badge_types::RecordId;

pub struct ShowProtocol<'a> {
    services: &'a FlowServices,
}

impl<'a> ShowProtocol<'a> {
    pub fn new(services: &'a FlowServices) -> Self {
        Self { services }
    }

    /// Read the current version of `id`, decrement it and finalize.
    ///
    /// Losing a race against another use of the same version surfaces as
    /// [`ProtocolError::DoubleSpend`]; nothing is retried here.
    pub async fn run(&self, id: RecordId) -> Result<Confirmation, ProtocolError> {
        let tx = ProposalBuilder::new(self.services).show(&id)?;
        self.services.contract.verify_transition(&tx)?;
        let record = tx.outputs.first().cloned().ok_or_else(|| {
            ContractViolation::MalformedTransition {
                reason: "show has no output".into(),
            }
        })?;
        tracing::debug!(record_id = %id, remaining = record.remaining_uses, "show proposal verified");

        let collected = SignatureCollector::new(self.services, tx).collect().await?;
        let outcome = FinalityCommitter::new(self.services)
            .commit(collected.transition, collected.sessions)
            .await?;

        let confirmation = Confirmation::shown(record, outcome);
        tracing::info!(tx_id = %confirmation.tx_id, record_id = %id, "{}", confirmation.message);
        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use badge_store::Ledger;
    use std::sync::Arc;

    #[tokio::test]
    async fn each_show_uses_one() {
        let fx = Fixture::new();
        let id = fx.seed_badge(2).record.id;
        let show = ShowProtocol::new(&fx.holder.services);

        let first = show.run(id).await.unwrap();
        assert_eq!(first.message, "The Explorer badge has 1 times left to show!");
        let second = show.run(id).await.unwrap();
        assert_eq!(second.record.remaining_uses, 0);

        let err = show.run(id).await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Contract(ContractViolation::InsufficientBalance { input: 0, .. })
        ));
        assert_eq!(fx.holder.ledger.history(&id).unwrap().len(), 3);
        let issuers = fx.issuer.ledger.get_current(&id).unwrap().unwrap();
        assert_eq!(issuers.record.remaining_uses, 0);
    }

    #[tokio::test]
    async fn unknown_badge_is_not_found() {
        let fx = Fixture::new();
        let err = ShowProtocol::new(&fx.holder.services)
            .run(RecordId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::RecordNotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_shows_of_last_use_have_one_winner() {
        let fx = Fixture::new();
        let id = fx.seed_badge(1).record.id;
        fx.notary.hold_until(2);
        let services = Arc::new(fx.holder.services.clone());

        let run = |services: Arc<crate::FlowServices>| async move {
            ShowProtocol::new(&services).run(id).await
        };
        let (a, b) = tokio::join!(
            tokio::spawn(run(Arc::clone(&services))),
            tokio::spawn(run(Arc::clone(&services)))
        );
        let results = [a.unwrap(), b.unwrap()];

        let wins = results.iter().filter(|r| r.is_ok()).count();
        let double_spends = results
            .iter()
            .filter(|r| matches!(r, Err(ProtocolError::DoubleSpend { .. })))
            .count();
        assert_eq!((wins, double_spends), (1, 1));
        let current = fx.holder.ledger.get_current(&id).unwrap().unwrap();
        assert_eq!(current.record.remaining_uses, 0);
    }
}

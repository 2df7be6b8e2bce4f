//! The counterparty side of both protocols.
//!
//! A responder serves one inbound session at a time: it reviews signature
//! requests against its own ledger and records finality notices.

use crate::collector::sign_locally;
use crate::{FlowServices, ProtocolError};
use async_trait::async_trait;
use badge_contracts::{ContractViolation, SignedTransition, TransitionSignature};
use badge_messages::{FinalityAck, FinalityNotice, FlowMessage, Refusal, SignatureResponse};
use badge_network::{InboundHandler, Session, SessionError};
use badge_types::{PublicKey, TxHash};
use std::collections::BTreeSet;

/// Counts of what one served session did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServeSummary {
    pub signed: usize,
    pub refused: usize,
    pub recorded: usize,
}

pub struct Responder {
    services: FlowServices,
}

impl Responder {
    pub fn new(services: FlowServices) -> Self {
        Self { services }
    }

    /// Answer messages on `session` until the initiator closes it.
    pub async fn serve(&self, mut session: Box<dyn Session>) -> ServeSummary {
        let mut summary = ServeSummary::default();
        let initiator = session.counterparty().clone();
        loop {
            let message = match session.receive().await {
                Ok(message) => message,
                Err(SessionError::Codec(e)) => {
                    tracing::warn!(party = %initiator, error = %e, "undecodable message");
                    let violation = ContractViolation::MalformedTransition {
                        reason: e.to_string(),
                    };
                    summary.refused += 1;
                    let reply = FlowMessage::SignatureResponse(SignatureResponse::Rejected(
                        Refusal::invalid(violation.to_string()),
                    ));
                    if session.send(reply).await.is_err() {
                        break;
                    }
                    continue;
                }
                Err(SessionError::Closed(_)) => break,
                Err(e) => {
                    tracing::debug!(party = %initiator, error = %e, "session ended");
                    break;
                }
            };

            let reply = match message {
                FlowMessage::SignatureRequest(request) => {
                    let tx_id = request.proposal.id();
                    match self.review(&request.proposal, &initiator.key) {
                        Ok(signature) => {
                            tracing::info!(%tx_id, party = %initiator, "signing proposal");
                            summary.signed += 1;
                            SignatureResponse::Approved(signature)
                        }
                        Err(e) => {
                            tracing::warn!(%tx_id, party = %initiator, error = %e, "refusing to sign");
                            summary.refused += 1;
                            SignatureResponse::Rejected(refusal_for(&e))
                        }
                    }
                }
                FlowMessage::FinalityNotice(notice) => match self.record(&notice).await {
                    Ok(()) => {
                        tracing::info!(tx_id = %notice.tx_id, party = %initiator, "recorded finalized transition");
                        summary.recorded += 1;
                        let ack = FlowMessage::FinalityAck(FinalityAck {
                            tx_id: notice.tx_id,
                        });
                        if session.send(ack).await.is_err() {
                            break;
                        }
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(tx_id = %notice.tx_id, party = %initiator, error = %e, "ignoring finality notice");
                        break;
                    }
                },
                other => {
                    tracing::warn!(party = %initiator, kind = other.kind(), "unexpected message");
                    break;
                }
            };

            if session
                .send(FlowMessage::SignatureResponse(reply))
                .await
                .is_err()
            {
                break;
            }
        }
        session.close().await;
        summary
    }

    /// Decide whether to sign `proposal`, which `initiator` has already signed.
    fn review(
        &self,
        proposal: &SignedTransition,
        initiator: &PublicKey,
    ) -> Result<TransitionSignature, ProtocolError> {
        let tx = &proposal.transition;
        if !tx.required_signers.contains(&self.services.me) {
            return Err(ProtocolError::InvalidParameters(format!(
                "{} is not a required signer",
                self.services.me
            )));
        }

        let still_unsigned: BTreeSet<PublicKey> = tx
            .required_signers
            .iter()
            .map(|p| p.key.clone())
            .filter(|key| key != initiator)
            .collect();
        proposal.verify_signatures_except(&still_unsigned)?;
        self.services.contract.verify_transition(tx)?;

        for input in &tx.inputs {
            let id = input.record.id;
            let current = self
                .services
                .ledger
                .get_current(&id)?
                .ok_or(ProtocolError::RecordNotFound(id))?;
            if current != *input {
                return Err(ProtocolError::StaleInput {
                    party: self.services.me.name.clone(),
                    reason: format!(
                        "input {} of badge {} is not the current version {}",
                        input.version, id, current.version
                    ),
                });
            }
        }

        Ok(sign_locally(&self.services, &proposal.id()))
    }

    /// Record a finalized transition, but only once the uniqueness service
    /// confirms it accepted that transition and every known input is still
    /// our current version.
    async fn record(&self, notice: &FinalityNotice) -> Result<(), ProtocolError> {
        let finalized = &notice.finalized;
        let tx_id: TxHash = finalized.id();
        if tx_id != notice.tx_id {
            return Err(ProtocolError::InvalidParameters(format!(
                "notice names {} but the transition hashes to {}",
                notice.tx_id, tx_id
            )));
        }
        finalized.verify_signatures()?;
        self.services.contract.verify_transition(&finalized.transition)?;

        if !self.services.notary.is_committed(&tx_id).await? {
            return Err(ProtocolError::NotFinal(tx_id));
        }

        for input in &finalized.transition.inputs {
            let Some(current) = self.services.ledger.get_current(&input.record.id)? else {
                continue;
            };
            // a repeated notice finds its own output already current
            if current != *input && current.version.tx_id != tx_id {
                return Err(ProtocolError::StaleInput {
                    party: self.services.me.name.clone(),
                    reason: format!(
                        "notice consumes {} of badge {} but the current version is {}",
                        input.version, input.record.id, current.version
                    ),
                });
            }
        }

        for output in finalized.transition.finalized_outputs() {
            let id = output.record.id;
            self.services.ledger.record_finalized(&id, output)?;
        }
        Ok(())
    }
}

fn refusal_for(error: &ProtocolError) -> Refusal {
    match error {
        ProtocolError::StaleInput { reason, .. } => Refusal::stale(reason.clone()),
        other => Refusal::invalid(other.to_string()),
    }
}

#[async_trait]
impl InboundHandler for Responder {
    async fn handle(&self, session: Box<dyn Session>) {
        let summary = self.serve(session).await;
        tracing::debug!(?summary, "inbound session served");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use crate::{IssueIntent, ProposalBuilder};
    use badge_contracts::{RecordVersion, Transition};
    use badge_messages::{RefusalKind, SignatureRequest};
    use badge_nullables::NullSession;
    use badge_store::{Ledger, UniquenessService};
    use badge_types::VersionRef;

    fn issue(fx: &Fixture) -> Transition {
        ProposalBuilder::new(&fx.issuer.services)
            .issue(&IssueIntent {
                name: "Explorer".into(),
                holder: fx.holder.services.me.clone(),
                description: "visited every continent".into(),
                starting_balance: 3,
            })
            .unwrap()
    }

    fn signed_by_issuer(fx: &Fixture, tx: Transition) -> SignedTransition {
        let mut signed = SignedTransition::new(tx);
        let id = signed.id();
        signed.add_signature(sign_locally(&fx.issuer.services, &id));
        signed
    }

    /// A Show of a badge both the holder and the issuer know, signed by the
    /// holder but not yet committed anywhere.
    fn show_known_to_issuer(fx: &Fixture) -> (RecordVersion, SignedTransition) {
        let current = fx.seed_badge(2);
        fx.issuer
            .ledger
            .record_finalized(&current.record.id, current.clone())
            .unwrap();
        let tx = ProposalBuilder::new(&fx.holder.services)
            .show(&current.record.id)
            .unwrap();
        let mut signed = SignedTransition::new(tx);
        let id = signed.id();
        signed.add_signature(sign_locally(&fx.holder.services, &id));
        (current, signed)
    }

    async fn ask(fx: &Fixture, proposal: SignedTransition) -> SignatureResponse {
        let (mut ours, theirs) = NullSession::pair(
            fx.issuer.services.me.clone(),
            fx.holder.services.me.clone(),
        );
        let responder = Responder::new(fx.holder.services.clone());
        let served = tokio::spawn(async move { responder.serve(Box::new(theirs)).await });
        let reply = ours
            .send_and_receive(FlowMessage::SignatureRequest(SignatureRequest { proposal }))
            .await
            .unwrap();
        ours.close().await;
        served.await.unwrap();
        match reply {
            FlowMessage::SignatureResponse(response) => response,
            other => panic!("unexpected {}", other.kind()),
        }
    }

    /// Send `finalized` from the holder to the issuer's responder.
    async fn notify_issuer(
        fx: &Fixture,
        finalized: SignedTransition,
    ) -> (Result<FlowMessage, SessionError>, ServeSummary) {
        let tx_id = finalized.id();
        let (mut ours, theirs) = NullSession::pair(
            fx.holder.services.me.clone(),
            fx.issuer.services.me.clone(),
        );
        let responder = Responder::new(fx.issuer.services.clone());
        let served = tokio::spawn(async move { responder.serve(Box::new(theirs)).await });
        let reply = ours
            .send_and_receive(FlowMessage::FinalityNotice(FinalityNotice { finalized, tx_id }))
            .await;
        ours.close().await;
        (reply, served.await.unwrap())
    }

    #[tokio::test]
    async fn signs_valid_issue() {
        let fx = Fixture::new();
        let proposal = signed_by_issuer(&fx, issue(&fx));
        let tx_id = proposal.id();
        match ask(&fx, proposal).await {
            SignatureResponse::Approved(sig) => {
                assert_eq!(sig.by, fx.holder.services.me.key);
                assert!(sig.is_valid_for(&tx_id));
            }
            SignatureResponse::Rejected(refusal) => panic!("rejected: {}", refusal.reason),
        }
    }

    #[tokio::test]
    async fn refuses_unsigned_proposal() {
        let fx = Fixture::new();
        let proposal = SignedTransition::new(issue(&fx));
        let SignatureResponse::Rejected(refusal) = ask(&fx, proposal).await else {
            panic!("expected a refusal");
        };
        assert_eq!(refusal.kind, RefusalKind::Invalid);
    }

    #[tokio::test]
    async fn refuses_when_not_a_signer() {
        let fx = Fixture::new();
        let mut tx = issue(&fx);
        tx.required_signers.remove(&fx.holder.services.me);
        let proposal = signed_by_issuer(&fx, tx);
        let SignatureResponse::Rejected(refusal) = ask(&fx, proposal).await else {
            panic!("expected a refusal");
        };
        assert!(refusal.reason.contains("not a required signer"));
    }

    #[tokio::test]
    async fn refuses_show_of_stale_version_as_stale() {
        let fx = Fixture::new();
        let current = fx.seed_badge(2);
        let mut tx = ProposalBuilder::new(&fx.holder.services)
            .show(&current.record.id)
            .unwrap();
        // pretend a second participant must sign, so the holder gets asked
        tx.required_signers.insert(fx.issuer.services.me.clone());
        let next = current.record.after_one_use().unwrap();
        let newer = RecordVersion::new(next, VersionRef::new(TxHash::new([8u8; 32]), 0));
        fx.holder.ledger.record_finalized(&current.record.id, newer).unwrap();

        let proposal = signed_by_issuer(&fx, tx);
        let SignatureResponse::Rejected(refusal) = ask(&fx, proposal).await else {
            panic!("expected a refusal");
        };
        assert_eq!(refusal.kind, RefusalKind::StaleInput);
        assert!(refusal.reason.contains("not the current version"));
    }

    #[tokio::test]
    async fn records_finality_notice_and_acks() {
        let fx = Fixture::new();
        let mut finalized = signed_by_issuer(&fx, issue(&fx));
        let tx_id = finalized.id();
        finalized.add_signature(sign_locally(&fx.holder.services, &tx_id));
        let record_id = finalized.transition.outputs[0].id;
        fx.notary
            .try_commit(&finalized.transition.consumed(), VersionRef::new(tx_id, 0))
            .await
            .unwrap();

        let (mut ours, theirs) = NullSession::pair(
            fx.issuer.services.me.clone(),
            fx.holder.services.me.clone(),
        );
        let responder = Responder::new(fx.holder.services.clone());
        let served = tokio::spawn(async move { responder.serve(Box::new(theirs)).await });
        let reply = ours
            .send_and_receive(FlowMessage::FinalityNotice(FinalityNotice { finalized, tx_id }))
            .await
            .unwrap();
        ours.close().await;

        assert_eq!(reply, FlowMessage::FinalityAck(FinalityAck { tx_id }));
        let summary = served.await.unwrap();
        assert_eq!(summary.recorded, 1);
        let current = fx.holder.ledger.get_current(&record_id).unwrap().unwrap();
        assert_eq!(current.version.tx_id, tx_id);
    }

    #[tokio::test]
    async fn ignores_notice_the_notary_never_accepted() {
        let fx = Fixture::new();
        let (current, signed) = show_known_to_issuer(&fx);

        let (reply, summary) = notify_issuer(&fx, signed).await;

        assert!(matches!(reply, Err(SessionError::Closed(_))));
        assert_eq!(summary.recorded, 0);
        assert_eq!(fx.notary.attempts(), 0);
        let issuers = fx.issuer.ledger.get_current(&current.record.id).unwrap().unwrap();
        assert_eq!(issuers, current);
    }

    #[tokio::test]
    async fn ignores_notice_while_notary_is_unavailable() {
        let fx = Fixture::new();
        let (current, signed) = show_known_to_issuer(&fx);
        let tx_id = signed.id();
        fx.notary
            .try_commit(&signed.transition.consumed(), VersionRef::new(tx_id, 0))
            .await
            .unwrap();
        fx.notary.set_unavailable(true);

        let (reply, summary) = notify_issuer(&fx, signed).await;

        assert!(reply.is_err());
        assert_eq!(summary.recorded, 0);
        let issuers = fx.issuer.ledger.get_current(&current.record.id).unwrap().unwrap();
        assert_eq!(issuers, current);
    }

    #[tokio::test]
    async fn ignores_committed_notice_over_a_newer_local_version() {
        let fx = Fixture::new();
        let (current, signed) = show_known_to_issuer(&fx);
        let tx_id = signed.id();
        fx.notary
            .try_commit(&signed.transition.consumed(), VersionRef::new(tx_id, 0))
            .await
            .unwrap();
        let next = current.record.after_one_use().unwrap();
        let newer = RecordVersion::new(next, VersionRef::new(TxHash::new([8u8; 32]), 0));
        fx.issuer
            .ledger
            .record_finalized(&current.record.id, newer.clone())
            .unwrap();

        let (reply, summary) = notify_issuer(&fx, signed).await;

        assert!(matches!(reply, Err(SessionError::Closed(_))));
        assert_eq!(summary.recorded, 0);
        let issuers = fx.issuer.ledger.get_current(&current.record.id).unwrap().unwrap();
        assert_eq!(issuers, newer);
    }

    #[tokio::test]
    async fn repeated_notice_is_acked_again() {
        let fx = Fixture::new();
        let (current, signed) = show_known_to_issuer(&fx);
        let tx_id = signed.id();
        fx.notary
            .try_commit(&signed.transition.consumed(), VersionRef::new(tx_id, 0))
            .await
            .unwrap();

        let (first, _) = notify_issuer(&fx, signed.clone()).await;
        let (second, _) = notify_issuer(&fx, signed).await;

        let ack = FlowMessage::FinalityAck(FinalityAck { tx_id });
        assert_eq!(first.unwrap(), ack);
        assert_eq!(second.unwrap(), ack);
        assert_eq!(fx.issuer.ledger.history(&current.record.id).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn ignores_notice_with_wrong_tx_id() {
        let fx = Fixture::new();
        let mut finalized = signed_by_issuer(&fx, issue(&fx));
        let tx_id = finalized.id();
        finalized.add_signature(sign_locally(&fx.holder.services, &tx_id));
        let record_id = finalized.transition.outputs[0].id;

        let (mut ours, theirs) = NullSession::pair(
            fx.issuer.services.me.clone(),
            fx.holder.services.me.clone(),
        );
        let responder = Responder::new(fx.holder.services.clone());
        let served = tokio::spawn(async move { responder.serve(Box::new(theirs)).await });
        let reply = ours
            .send_and_receive(FlowMessage::FinalityNotice(FinalityNotice {
                finalized,
                tx_id: TxHash::new([1u8; 32]),
            }))
            .await;

        assert!(matches!(reply, Err(SessionError::Closed(_))));
        assert_eq!(served.await.unwrap().recorded, 0);
        assert!(fx.holder.ledger.get_current(&record_id).unwrap().is_none());
    }
}

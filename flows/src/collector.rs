//! Signature collection: sign locally, then ask every other required signer.

use crate::{FlowServices, ProtocolError};
use badge_contracts::{SignedTransition, Transition, TransitionSignature};
use badge_messages::{FlowMessage, Refusal, RefusalKind, SignatureRequest, SignatureResponse};
use badge_network::{Network, Session, SessionError};
use badge_types::{Party, PartyName, TxHash};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Where a proposal is in the collection process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectionState {
    Built,
    AwaitingLocalSignature,
    AwaitingRemoteSignatures { pending: BTreeSet<PartyName> },
    FullySigned,
    Rejected { by: PartyName, reason: String },
    Failed { party: PartyName, cause: String },
}

impl CollectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::FullySigned | Self::Rejected { .. } | Self::Failed { .. }
        )
    }
}

/// A fully-signed transition and the sessions used to collect it.
///
/// The sessions stay open so finality can be delivered over them.
pub struct CollectedSignatures {
    pub transition: SignedTransition,
    pub sessions: Vec<Box<dyn Session>>,
}

/// What one counterparty task came back with.
enum Reply {
    Approved(TransitionSignature, Box<dyn Session>),
    Refused(Refusal),
    Unanswered(String),
}

/// Drives one proposal from `Built` to `FullySigned`.
///
/// Fails fast: the first refusal or missing answer aborts every outstanding
/// request, and no partially signed transition is returned.
pub struct SignatureCollector<'a> {
    services: &'a FlowServices,
    proposal: SignedTransition,
    state: CollectionState,
}

impl<'a> SignatureCollector<'a> {
    pub fn new(services: &'a FlowServices, transition: Transition) -> Self {
        Self {
            services,
            proposal: SignedTransition::new(transition),
            state: CollectionState::Built,
        }
    }

    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    pub async fn collect(&mut self) -> Result<CollectedSignatures, ProtocolError> {
        let tx_id = self.proposal.id();

        self.state = CollectionState::AwaitingLocalSignature;
        let me = &self.services.me;
        if self.proposal.transition.required_signers.contains(me) {
            self.proposal.add_signature(sign_locally(self.services, &tx_id));
        }

        let counterparties: Vec<Party> = self
            .proposal
            .transition
            .required_signers
            .iter()
            .filter(|party| *party != me)
            .cloned()
            .collect();
        let mut pending: BTreeSet<PartyName> =
            counterparties.iter().map(|p| p.name.clone()).collect();
        self.state = CollectionState::AwaitingRemoteSignatures {
            pending: pending.clone(),
        };
        tracing::debug!(%tx_id, counterparties = counterparties.len(), "collecting signatures");

        let mut tasks = JoinSet::new();
        let mut task_owner = HashMap::new();
        for party in counterparties {
            let network = Arc::clone(&self.services.network);
            let proposal = self.proposal.clone();
            let name = party.name.clone();
            let handle = tasks.spawn(async move {
                let reply = request_signature(network.as_ref(), &party, proposal).await;
                (party, reply)
            });
            task_owner.insert(handle.id(), name);
        }

        let deadline = tokio::time::Instant::now() + self.services.timeouts.collection;
        let mut sessions: Vec<Box<dyn Session>> = Vec::new();
        let failure = loop {
            let joined = match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(joined)) => joined,
                Ok(None) => break None,
                Err(_) => {
                    let silent: Vec<String> = pending.iter().map(ToString::to_string).collect();
                    break pending.first().map(|party| ProtocolError::CollectionFailed {
                        party: party.clone(),
                        cause: format!(
                            "no answer from {} within {} ms",
                            silent.join("; "),
                            self.services.timeouts.collection.as_millis()
                        ),
                    })
                }
            };
            let (party, reply) = match joined {
                Ok(done) => done,
                Err(e) => {
                    let party = task_owner
                        .get(&e.id())
                        .cloned()
                        .unwrap_or_else(|| me.name.clone());
                    break Some(ProtocolError::CollectionFailed {
                        party,
                        cause: e.to_string(),
                    });
                }
            };

            match reply {
                Reply::Approved(signature, session) => {
                    sessions.push(session);
                    if signature.by != party.key || !signature.is_valid_for(&tx_id) {
                        tracing::warn!(%tx_id, party = %party, "approval carries an invalid signature");
                        break Some(ProtocolError::Rejected {
                            by: party.name,
                            reason: "approval signature does not verify".into(),
                        });
                    }
                    tracing::debug!(%tx_id, party = %party, "signature received");
                    self.proposal.add_signature(signature);
                    pending.remove(&party.name);
                    self.state = CollectionState::AwaitingRemoteSignatures {
                        pending: pending.clone(),
                    };
                }
                Reply::Refused(Refusal {
                    kind: RefusalKind::StaleInput,
                    reason,
                }) => {
                    break Some(ProtocolError::StaleInput {
                        party: party.name,
                        reason,
                    })
                }
                Reply::Refused(Refusal { reason, .. }) => {
                    break Some(ProtocolError::Rejected {
                        by: party.name,
                        reason,
                    })
                }
                Reply::Unanswered(cause) => {
                    break Some(ProtocolError::CollectionFailed {
                        party: party.name,
                        cause,
                    })
                }
            }
        };

        if let Some(err) = failure {
            tasks.abort_all();
            for session in &mut sessions {
                session.close().await;
            }
            tracing::warn!(%tx_id, error = %err, "signature collection failed");
            self.state = match &err {
                ProtocolError::Rejected { by, reason }
                | ProtocolError::StaleInput { party: by, reason } => CollectionState::Rejected {
                    by: by.clone(),
                    reason: reason.clone(),
                },
                ProtocolError::CollectionFailed { party, cause } => CollectionState::Failed {
                    party: party.clone(),
                    cause: cause.clone(),
                },
                other => CollectionState::Failed {
                    party: me.name.clone(),
                    cause: other.to_string(),
                },
            };
            return Err(err);
        }

        self.proposal.verify_signatures()?;
        self.state = CollectionState::FullySigned;
        tracing::debug!(%tx_id, "fully signed");
        Ok(CollectedSignatures {
            transition: self.proposal.clone(),
            sessions,
        })
    }
}

async fn request_signature(network: &dyn Network, party: &Party, proposal: SignedTransition) -> Reply {
    let mut session = match network.open(party).await {
        Ok(session) => session,
        Err(e) => return Reply::Unanswered(e.to_string()),
    };
    let request = FlowMessage::SignatureRequest(SignatureRequest { proposal });
    match session.send_and_receive(request).await {
        Ok(FlowMessage::SignatureResponse(SignatureResponse::Approved(signature))) => {
            Reply::Approved(signature, session)
        }
        Ok(FlowMessage::SignatureResponse(SignatureResponse::Rejected(refusal))) => {
            session.close().await;
            Reply::Refused(refusal)
        }
        Ok(other) => {
            session.close().await;
            let unexpected = SessionError::UnexpectedMessage {
                party: party.name.clone(),
                expected: "signature_response",
                got: other.kind(),
            };
            Reply::Unanswered(unexpected.to_string())
        }
        Err(e) => Reply::Unanswered(e.to_string()),
    }
}

/// Sign `tx_id` with the local identity.
pub(crate) fn sign_locally(services: &FlowServices, tx_id: &TxHash) -> TransitionSignature {
    TransitionSignature::new(
        services.signer.public_key().clone(),
        services.signer.sign(tx_id.as_bytes()),
    )
}

//! Commit a fully-signed transition and tell everyone who needs to know.

use crate::{FlowServices, ProtocolError};
use badge_contracts::{RecordVersion, SignedTransition};
use badge_messages::{FinalityNotice, FlowMessage};
use badge_network::{Network, Session, SessionError};
use badge_store::CommitOutcome;
use badge_types::{Party, PartyName, RecordId, TxHash, VersionRef};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// What finality produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalityOutcome {
    pub tx_id: TxHash,
    /// The new current versions, as recorded locally.
    pub outputs: Vec<RecordVersion>,
    /// Parties that did not acknowledge the finality notice.
    pub undelivered: Vec<PartyName>,
    /// Outputs the local ledger failed to store. The transition is final
    /// regardless; these need recording again from `outputs`.
    pub unrecorded: Vec<RecordId>,
}

pub struct FinalityCommitter<'a> {
    services: &'a FlowServices,
}

impl<'a> FinalityCommitter<'a> {
    pub fn new(services: &'a FlowServices) -> Self {
        Self { services }
    }

    /// Commit `signed` through the uniqueness service, record it locally and
    /// distribute it, reusing `sessions` where they lead to a recipient.
    ///
    /// Once the uniqueness service has accepted, the transition is final:
    /// local storage and delivery failures only show up in
    /// [`FinalityOutcome::unrecorded`] and [`FinalityOutcome::undelivered`].
    pub async fn commit(
        &self,
        signed: SignedTransition,
        sessions: Vec<Box<dyn Session>>,
    ) -> Result<FinalityOutcome, ProtocolError> {
        let mut sessions: HashMap<PartyName, Box<dyn Session>> = sessions
            .into_iter()
            .map(|s| (s.counterparty().name.clone(), s))
            .collect();

        if let Err(e) = signed.verify_signatures() {
            close_all(sessions.into_values()).await;
            return Err(e.into());
        }

        let tx_id = signed.id();
        let consumed = signed.transition.consumed();
        let outcome = match self
            .services
            .notary
            .try_commit(&consumed, VersionRef::new(tx_id, 0))
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                close_all(sessions.into_values()).await;
                return Err(e.into());
            }
        };
        if let CommitOutcome::DoubleSpend {
            conflicts,
            consumed_by,
        } = outcome
        {
            tracing::warn!(%tx_id, %consumed_by, "inputs already consumed");
            close_all(sessions.into_values()).await;
            return Err(ProtocolError::DoubleSpend {
                conflicts,
                consumed_by,
            });
        }
        tracing::info!(%tx_id, inputs = consumed.len(), "transition accepted");

        let outputs = signed.transition.finalized_outputs();
        let mut unrecorded = Vec::new();
        for output in &outputs {
            let id = output.record.id;
            if let Err(e) = self.services.ledger.record_finalized(&id, output.clone()) {
                tracing::warn!(%tx_id, record = %id, error = %e, "could not record final version locally");
                unrecorded.push(id);
            }
        }

        let recipients = signed.transition.recipients(&self.services.me);
        let notice = FinalityNotice {
            finalized: signed,
            tx_id,
        };
        let mut deliveries = JoinSet::new();
        for party in recipients {
            let session = sessions.remove(&party.name);
            let network = Arc::clone(&self.services.network);
            let notice = notice.clone();
            let wait = self.services.timeouts.finality;
            deliveries.spawn(async move {
                let delivered = deliver(network.as_ref(), &party, session, notice, wait).await;
                (party, delivered)
            });
        }
        close_all(sessions.into_values()).await;

        let mut undelivered = Vec::new();
        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((party, Err(e))) => {
                    tracing::warn!(%tx_id, party = %party, error = %e, "finality notice not acknowledged");
                    undelivered.push(party.name);
                }
                Err(e) => tracing::warn!(%tx_id, error = %e, "finality delivery task failed"),
            }
        }
        undelivered.sort();

        Ok(FinalityOutcome {
            tx_id,
            outputs,
            undelivered,
            unrecorded,
        })
    }
}

async fn deliver(
    network: &dyn Network,
    party: &Party,
    session: Option<Box<dyn Session>>,
    notice: FinalityNotice,
    wait: Duration,
) -> Result<(), SessionError> {
    let mut session = match session {
        Some(session) => session,
        None => network.open(party).await?,
    };
    let tx_id = notice.tx_id;
    let reply = tokio::time::timeout(
        wait,
        session.send_and_receive(FlowMessage::FinalityNotice(notice)),
    )
    .await;
    session.close().await;
    match reply {
        Err(_) => Err(SessionError::Timeout(party.name.clone())),
        Ok(Err(e)) => Err(e),
        Ok(Ok(FlowMessage::FinalityAck(ack))) if ack.tx_id == tx_id => Ok(()),
        Ok(Ok(other)) => Err(SessionError::UnexpectedMessage {
            party: party.name.clone(),
            expected: "finality_ack",
            got: other.kind(),
        }),
    }
}

async fn close_all(sessions: impl IntoIterator<Item = Box<dyn Session>>) {
    for mut session in sessions {
        session.close().await;
    }
}

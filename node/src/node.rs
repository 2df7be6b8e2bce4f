//! The badge node: one party's entry point to issue and show.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::Instrument;

use badge_contracts::RecordVersion;
use badge_crypto::SigningService;
use badge_flows::{
    Confirmation, FlowServices, IssueIntent, IssueProtocol, ProtocolError, Responder, ShowProtocol,
};
use badge_network::{InboundHandler, Network, Session};
use badge_store::{Ledger, UniquenessService};
use badge_types::{Clock, Party, RecordId};

use crate::tracing_spans::{issue_span, respond_span, show_span};
use crate::{FlowMetrics, NodeConfig, NodeError};

/// The collaborators a node is wired to.
pub struct NodeDeps {
    pub ledger: Arc<dyn Ledger>,
    pub notary: Arc<dyn UniquenessService>,
    pub network: Arc<dyn Network>,
    pub clock: Arc<dyn Clock>,
}

/// One party on the badge network.
///
/// Initiates issue and show invocations, and answers sessions other parties
/// open towards it (register it with the network as an [`InboundHandler`]).
pub struct BadgeNode {
    services: FlowServices,
    responder: Responder,
    metrics: FlowMetrics,
}

impl BadgeNode {
    pub fn new(services: FlowServices) -> Self {
        let responder = Responder::new(services.clone());
        Self {
            services,
            responder,
            metrics: FlowMetrics::new(),
        }
    }

    /// Build a node from configuration and its collaborators.
    pub fn from_config(
        config: &NodeConfig,
        signer: Arc<dyn SigningService>,
        deps: NodeDeps,
    ) -> Result<Self, NodeError> {
        let me = Party::new(config.party_name()?, signer.public_key().clone());
        let services = FlowServices {
            me,
            signer,
            contract: config.contract()?,
            ledger: deps.ledger,
            notary: deps.notary,
            network: deps.network,
            clock: deps.clock,
            timeouts: config.timeouts(),
        };
        tracing::info!(
            party = %services.me,
            authority = %services.contract.issuing_authority(),
            "badge node ready"
        );
        Ok(Self::new(services))
    }

    pub fn identity(&self) -> &Party {
        &self.services.me
    }

    pub fn metrics(&self) -> &FlowMetrics {
        &self.metrics
    }

    /// Issue a badge to `holder`. Only succeeds on the issuing authority.
    pub async fn issue(
        &self,
        name: &str,
        holder: &Party,
        description: &str,
        starting_balance: i64,
    ) -> Result<Confirmation, ProtocolError> {
        let intent = IssueIntent {
            name: name.to_string(),
            holder: holder.clone(),
            description: description.to_string(),
            starting_balance,
        };
        let started = Instant::now();
        let result = IssueProtocol::new(&self.services)
            .run(intent)
            .instrument(issue_span(name, &holder.name))
            .await;
        self.observe(&result, started);
        if result.is_ok() {
            self.metrics.badges_issued.inc();
        }
        result
    }

    /// Use badge `id` once. Only the holder can show a badge.
    pub async fn show(&self, id: RecordId) -> Result<Confirmation, ProtocolError> {
        let started = Instant::now();
        let result = ShowProtocol::new(&self.services)
            .run(id)
            .instrument(show_span(&id))
            .await;
        self.observe(&result, started);
        if result.is_ok() {
            self.metrics.badges_shown.inc();
        }
        result
    }

    /// The current version of a badge as this node knows it.
    pub fn current(&self, id: &RecordId) -> Result<Option<RecordVersion>, NodeError> {
        Ok(self.services.ledger.get_current(id)?)
    }

    /// Every version of a badge this node has recorded, oldest first.
    pub fn history(&self, id: &RecordId) -> Result<Vec<RecordVersion>, NodeError> {
        Ok(self.services.ledger.history(id)?)
    }

    fn observe(&self, result: &Result<Confirmation, ProtocolError>, started: Instant) {
        self.metrics
            .flow_duration_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);
        if let Err(e) = result {
            tracing::warn!(error = %e, retryable = e.is_retryable(), "flow failed");
            self.metrics.record_failure(e);
        }
    }
}

#[async_trait]
impl InboundHandler for BadgeNode {
    async fn handle(&self, session: Box<dyn Session>) {
        let span = respond_span(&self.services.me.name, &session.counterparty().name);
        let summary = self.responder.serve(session).instrument(span).await;
        self.metrics.record_served(&summary);
    }
}

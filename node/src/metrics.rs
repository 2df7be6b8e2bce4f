//! Prometheus metrics for the badge node.
//!
//! [`FlowMetrics`] owns a dedicated [`Registry`] so several nodes can live in
//! one process (as they do in tests) without clashing on the default one.

use badge_flows::{ProtocolError, ServeSummary};
use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry, Histogram,
    HistogramOpts, IntCounter, Opts, Registry,
};

pub struct FlowMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Initiator side ──────────────────────────────────────────────────
    /// Badges this node issued.
    pub badges_issued: IntCounter,
    /// Badge uses this node finalized as holder.
    pub badges_shown: IntCounter,
    /// Proposals stopped by the local contract check or bad parameters.
    pub proposals_invalid: IntCounter,
    /// Proposals a counterparty refused to sign.
    pub proposals_rejected: IntCounter,
    /// Commits refused because an input was already consumed.
    pub double_spends: IntCounter,
    /// Signature rounds that failed for lack of an answer.
    pub collection_failures: IntCounter,

    // ── Responder side ──────────────────────────────────────────────────
    pub signatures_granted: IntCounter,
    pub signatures_refused: IntCounter,
    pub notices_recorded: IntCounter,

    /// Time from proposal to confirmation, in milliseconds.
    pub flow_duration_ms: Histogram,
}

impl FlowMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let counter = |name: &str, help: &str| {
            register_int_counter_with_registry!(Opts::new(name, help), registry)
                .unwrap_or_else(|e| panic!("failed to register {name} counter: {e}"))
        };

        let badges_issued = counter("badge_issued_total", "Badges issued by this node");
        let badges_shown = counter("badge_shown_total", "Badge uses finalized by this node");
        let proposals_invalid = counter(
            "badge_proposals_invalid_total",
            "Proposals refused locally before any session opened",
        );
        let proposals_rejected = counter(
            "badge_proposals_rejected_total",
            "Proposals a counterparty refused to sign",
        );
        let double_spends = counter(
            "badge_double_spends_total",
            "Commits refused because an input was already consumed",
        );
        let collection_failures = counter(
            "badge_collection_failures_total",
            "Signature rounds that failed for lack of an answer",
        );
        let signatures_granted = counter(
            "badge_signatures_granted_total",
            "Signature requests this node approved",
        );
        let signatures_refused = counter(
            "badge_signatures_refused_total",
            "Signature requests this node refused",
        );
        let notices_recorded = counter(
            "badge_notices_recorded_total",
            "Finality notices recorded in the local ledger",
        );

        // 1 ms to ~16 s
        let flow_duration_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "badge_flow_duration_ms",
                "Issue and show duration in milliseconds"
            )
            .buckets(
                prometheus::exponential_buckets(1.0, 2.0, 15)
                    .expect("static bucket parameters are valid")
            ),
            registry
        )
        .expect("failed to register flow_duration_ms histogram");

        Self {
            registry,
            badges_issued,
            badges_shown,
            proposals_invalid,
            proposals_rejected,
            double_spends,
            collection_failures,
            signatures_granted,
            signatures_refused,
            notices_recorded,
            flow_duration_ms,
        }
    }

    /// Count a failed issue or show under the matching counter.
    pub fn record_failure(&self, error: &ProtocolError) {
        match error {
            ProtocolError::Contract(_)
            | ProtocolError::InvalidParameters(_)
            | ProtocolError::RecordNotFound(_) => self.proposals_invalid.inc(),
            ProtocolError::Rejected { .. } | ProtocolError::StaleInput { .. } => {
                self.proposals_rejected.inc()
            }
            ProtocolError::DoubleSpend { .. } => self.double_spends.inc(),
            ProtocolError::CollectionFailed { .. } | ProtocolError::Session(_) => {
                self.collection_failures.inc()
            }
            ProtocolError::Signatures(_)
            | ProtocolError::Store(_)
            | ProtocolError::NotFinal(_) => {}
        }
    }

    pub fn record_served(&self, summary: &ServeSummary) {
        self.signatures_granted.inc_by(summary.signed as u64);
        self.signatures_refused.inc_by(summary.refused as u64);
        self.notices_recorded.inc_by(summary.recorded as u64);
    }
}

impl Default for FlowMetrics {
    fn default() -> Self {
        Self::new()
    }
}

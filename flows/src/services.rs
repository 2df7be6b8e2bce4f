//! The collaborators a flow runs against.

use badge_contracts::BadgeContract;
use badge_crypto::SigningService;
use badge_network::Network;
use badge_store::{Ledger, UniquenessService};
use badge_types::{Clock, Party};
use std::sync::Arc;
use std::time::Duration;

/// How long a flow waits at each suspension point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowTimeouts {
    /// Upper bound on the whole remote signature round.
    pub collection: Duration,
    /// Upper bound on each finality acknowledgement.
    pub finality: Duration,
}

impl Default for FlowTimeouts {
    fn default() -> Self {
        Self {
            collection: Duration::from_secs(30),
            finality: Duration::from_secs(30),
        }
    }
}

/// Everything one party's flows need: identity, signer, contract, ledger,
/// uniqueness service, network and clock.
///
/// Cheap to clone; every collaborator is shared.
#[derive(Clone)]
pub struct FlowServices {
    pub me: Party,
    pub signer: Arc<dyn SigningService>,
    pub contract: BadgeContract,
    pub ledger: Arc<dyn Ledger>,
    pub notary: Arc<dyn UniquenessService>,
    pub network: Arc<dyn Network>,
    pub clock: Arc<dyn Clock>,
    pub timeouts: FlowTimeouts,
}

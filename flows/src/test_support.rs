//! Three parties wired together over nullables.

use crate::{FlowServices, FlowTimeouts, Responder};
use badge_contracts::{BadgeContract, BadgeRecord, RecordVersion, DEFAULT_ISSUING_AUTHORITY};
use badge_crypto::{keypair_from_seed, LocalSigner};
use badge_network::InboundHandler;
use badge_nullables::{NullClock, NullLedger, NullNetwork, NullNotary};
use badge_store::Ledger;
use badge_types::{Party, PartyName, RecordId, TxHash, VersionRef};
use chrono::NaiveDate;
use std::sync::Arc;

pub(crate) const HOLDER: &str = "O=PartyA, L=Paris, C=FR";
pub(crate) const OUTSIDER: &str = "O=PartyB, L=New York, C=US";

pub(crate) struct TestParty {
    pub services: FlowServices,
    pub ledger: Arc<NullLedger>,
    /// Keeps the registered responder alive.
    pub _responder: Arc<dyn InboundHandler>,
}

pub(crate) struct Fixture {
    pub network: NullNetwork,
    pub notary: Arc<NullNotary>,
    pub clock: Arc<NullClock>,
    /// The issuing authority.
    pub issuer: TestParty,
    pub holder: TestParty,
    /// A party the contract does not accept as issuer.
    pub outsider: TestParty,
}

impl Fixture {
    pub fn new() -> Self {
        let network = NullNetwork::new();
        let notary = Arc::new(NullNotary::new());
        let clock = Arc::new(NullClock::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"),
        ));
        let party = |name: &str, seed: u8| TestPartyBuilder {
            name: name.to_string(),
            seed,
            network: network.clone(),
            notary: Arc::clone(&notary),
            clock: Arc::clone(&clock),
        };
        let issuer = party(DEFAULT_ISSUING_AUTHORITY, 1).build();
        let holder = party(HOLDER, 2).build();
        let outsider = party(OUTSIDER, 3).build();
        Self {
            network,
            notary,
            clock,
            issuer,
            holder,
            outsider,
        }
    }

    pub fn today(&self) -> NaiveDate {
        use badge_types::Clock;
        self.clock.today()
    }

    /// Put a finalized badge with `uses` remaining into the holder's ledger,
    /// as if the authority had issued it earlier.
    pub fn seed_badge(&self, uses: u32) -> RecordVersion {
        let record = BadgeRecord::new(
            "Explorer",
            RecordId::generate(),
            self.today(),
            self.issuer.services.me.clone(),
            self.holder.services.me.clone(),
            "visited every continent",
            uses,
        );
        let version = RecordVersion::new(record, VersionRef::new(TxHash::new(rand::random()), 0));
        self.holder
            .ledger
            .record_finalized(&version.record.id, version.clone())
            .expect("null ledger accepts writes");
        version
    }
}

struct TestPartyBuilder {
    name: String,
    seed: u8,
    network: NullNetwork,
    notary: Arc<NullNotary>,
    clock: Arc<NullClock>,
}

impl TestPartyBuilder {
    fn build(self) -> TestParty {
        let keys = keypair_from_seed(&[self.seed; 32]);
        let me = Party::new(
            PartyName::new(self.name).expect("fixture names are not blank"),
            keys.public.clone(),
        );
        let ledger = Arc::new(NullLedger::new());
        let services = FlowServices {
            me: me.clone(),
            signer: Arc::new(LocalSigner::new(keys)),
            contract: BadgeContract::default(),
            ledger: ledger.clone(),
            notary: self.notary,
            network: Arc::new(self.network.handle_for(me.clone())),
            clock: self.clock,
            timeouts: FlowTimeouts::default(),
        };
        let responder: Arc<dyn InboundHandler> = Arc::new(Responder::new(services.clone()));
        self.network.register(&me, &responder);
        TestParty {
            services,
            ledger,
            _responder: responder,
        }
    }
}

//! Nullable network: in-process sessions between registered parties.
//!
//! Messages still go through the wire codec so that anything which could not
//! cross a real connection fails here too.

use async_trait::async_trait;
use badge_messages::{decode, encode, FlowMessage};
use badge_network::{InboundHandler, Network, Session, SessionError};
use badge_types::{Party, PartyName};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;

#[derive(Default)]
struct Hub {
    handlers: Mutex<HashMap<PartyName, Weak<dyn InboundHandler>>>,
    unreachable: Mutex<HashSet<PartyName>>,
    unresponsive: Mutex<HashSet<PartyName>>,
    /// Far ends of sessions whose counterparty never answers.
    parked: Mutex<Vec<NullSession>>,
    opened: Mutex<Vec<(PartyName, PartyName)>>,
}

/// A shared switchboard connecting every party in a test.
#[derive(Clone, Default)]
pub struct NullNetwork {
    hub: Arc<Hub>,
}

impl NullNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route sessions addressed to `party` to `handler`.
    ///
    /// Only a weak reference is kept, so a dropped handler behaves like a
    /// party that went offline.
    pub fn register(&self, party: &Party, handler: &Arc<dyn InboundHandler>) {
        self.hub
            .handlers
            .lock()
            .unwrap()
            .insert(party.name.clone(), Arc::downgrade(handler));
    }

    /// The [`Network`] view for one local party.
    pub fn handle_for(&self, me: Party) -> NullNetworkHandle {
        NullNetworkHandle {
            me,
            hub: Arc::clone(&self.hub),
        }
    }

    /// Make `open` towards `name` fail.
    pub fn set_unreachable(&self, name: &PartyName, unreachable: bool) {
        let mut set = self.hub.unreachable.lock().unwrap();
        if unreachable {
            set.insert(name.clone());
        } else {
            set.remove(name);
        }
    }

    /// Accept sessions towards `name` but never answer on them.
    pub fn set_unresponsive(&self, name: &PartyName, unresponsive: bool) {
        let mut set = self.hub.unresponsive.lock().unwrap();
        if unresponsive {
            set.insert(name.clone());
        } else {
            set.remove(name);
        }
    }

    /// Every `(from, to)` pair for which a session was opened, in order.
    pub fn opened_sessions(&self) -> Vec<(PartyName, PartyName)> {
        self.hub.opened.lock().unwrap().clone()
    }

    /// Clear the session log.
    pub fn reset(&self) {
        self.hub.opened.lock().unwrap().clear();
    }
}

/// One party's access to a [`NullNetwork`].
#[derive(Clone)]
pub struct NullNetworkHandle {
    me: Party,
    hub: Arc<Hub>,
}

#[async_trait]
impl Network for NullNetworkHandle {
    async fn open(&self, counterparty: &Party) -> Result<Box<dyn Session>, SessionError> {
        let name = &counterparty.name;
        if self.hub.unreachable.lock().unwrap().contains(name) {
            return Err(SessionError::Unreachable(name.clone()));
        }
        let handler = self
            .hub
            .handlers
            .lock()
            .unwrap()
            .get(name)
            .and_then(Weak::upgrade)
            .ok_or_else(|| SessionError::Unreachable(name.clone()))?;

        let (local, remote) = NullSession::pair(self.me.clone(), counterparty.clone());
        self.hub
            .opened
            .lock()
            .unwrap()
            .push((self.me.name.clone(), name.clone()));

        if self.hub.unresponsive.lock().unwrap().contains(name) {
            self.hub.parked.lock().unwrap().push(remote);
        } else {
            tokio::spawn(async move { handler.handle(Box::new(remote)).await });
        }
        Ok(Box::new(local))
    }
}

/// One end of an in-process session.
pub struct NullSession {
    counterparty: Party,
    outbound: Option<mpsc::UnboundedSender<Vec<u8>>>,
    inbound: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl NullSession {
    /// Two connected ends: the first is held by `initiator`, the second by
    /// `responder`.
    pub fn pair(initiator: Party, responder: Party) -> (Self, Self) {
        let (to_responder, from_initiator) = mpsc::unbounded_channel();
        let (to_initiator, from_responder) = mpsc::unbounded_channel();
        let initiator_end = Self {
            counterparty: responder,
            outbound: Some(to_responder),
            inbound: from_responder,
        };
        let responder_end = Self {
            counterparty: initiator,
            outbound: Some(to_initiator),
            inbound: from_initiator,
        };
        (initiator_end, responder_end)
    }

    fn closed(&self) -> SessionError {
        SessionError::Closed(self.counterparty.name.clone())
    }
}

#[async_trait]
impl Session for NullSession {
    fn counterparty(&self) -> &Party {
        &self.counterparty
    }

    async fn send(&mut self, message: FlowMessage) -> Result<(), SessionError> {
        let bytes = encode(&message)?;
        let outbound = self.outbound.as_ref().ok_or_else(|| self.closed())?;
        outbound.send(bytes).map_err(|_| self.closed())
    }

    async fn receive(&mut self) -> Result<FlowMessage, SessionError> {
        match self.inbound.recv().await {
            Some(bytes) => Ok(decode(&bytes)?),
            None => Err(self.closed()),
        }
    }

    async fn close(&mut self) {
        self.outbound = None;
        self.inbound.close();
    }
}

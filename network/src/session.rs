//! Session, network and inbound-handler traits.

use crate::SessionError;
use async_trait::async_trait;
use badge_messages::FlowMessage;
use badge_types::Party;

/// An ordered, bidirectional conversation with one counterparty.
#[async_trait]
pub trait Session: Send {
    /// Who is on the other end.
    fn counterparty(&self) -> &Party;

    async fn send(&mut self, message: FlowMessage) -> Result<(), SessionError>;

    /// Wait for the next message from the counterparty.
    async fn receive(&mut self) -> Result<FlowMessage, SessionError>;

    /// Close the session. Further sends fail; the counterparty sees `Closed`.
    async fn close(&mut self);

    /// Send `message` and wait for the reply.
    async fn send_and_receive(&mut self, message: FlowMessage) -> Result<FlowMessage, SessionError> {
        tracing::trace!(party = %self.counterparty(), kind = message.kind(), "send_and_receive");
        self.send(message).await?;
        self.receive().await
    }
}

/// Opens sessions on behalf of the local party.
#[async_trait]
pub trait Network: Send + Sync {
    async fn open(&self, counterparty: &Party) -> Result<Box<dyn Session>, SessionError>;
}

/// Serves sessions opened by other parties.
#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn handle(&self, session: Box<dyn Session>);
}

//! Party-to-party sessions.
//!
//! Transport and peer discovery live outside this workspace. The flows only
//! need to open a [`Session`] to a named counterparty through a [`Network`],
//! and to hand inbound sessions to an [`InboundHandler`].

pub mod error;
pub mod session;

pub use error::SessionError;
pub use session::{InboundHandler, Network, Session};

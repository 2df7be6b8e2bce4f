use badge_messages::CodecError;
use badge_types::PartyName;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("counterparty {0} is unreachable")]
    Unreachable(PartyName),

    #[error("session with {0} was closed")]
    Closed(PartyName),

    #[error("timed out waiting for {0}")]
    Timeout(PartyName),

    #[error("expected {expected} from {party}, got {got}")]
    UnexpectedMessage {
        party: PartyName,
        expected: &'static str,
        got: &'static str,
    },

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

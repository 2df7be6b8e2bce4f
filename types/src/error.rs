//! Parse errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("party name must not be empty")]
    EmptyPartyName,

    #[error("invalid record identifier: {0}")]
    InvalidRecordId(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),
}

//! The signing seam used by the agreement flows.
//!
//! Flows never touch private keys directly: they ask a [`SigningService`] for
//! the node's public key and for signatures over transition ids.

use badge_types::{KeyPair, PublicKey, Signature};

use crate::sign::sign_message;

/// Produces signatures on behalf of one identity.
pub trait SigningService: Send + Sync {
    /// The key counterparties verify our signatures with.
    fn public_key(&self) -> &PublicKey;

    /// Sign an arbitrary message.
    fn sign(&self, message: &[u8]) -> Signature;
}

/// A signer holding its key pair in process memory.
pub struct LocalSigner {
    keys: KeyPair,
}

impl LocalSigner {
    pub fn new(keys: KeyPair) -> Self {
        Self { keys }
    }
}

impl SigningService for LocalSigner {
    fn public_key(&self) -> &PublicKey {
        &self.keys.public
    }

    fn sign(&self, message: &[u8]) -> Signature {
        sign_message(message, &self.keys.private)
    }
}

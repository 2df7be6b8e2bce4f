//! Transitions with their collected signatures.

use crate::{SignatureError, Transition};
use badge_crypto::verify_signature;
use badge_types::{Party, PublicKey, Signature, TxHash};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One party's signature over a transition id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSignature {
    pub by: PublicKey,
    pub signature: Signature,
}

impl TransitionSignature {
    pub fn new(by: PublicKey, signature: Signature) -> Self {
        Self { by, signature }
    }

    pub fn is_valid_for(&self, tx_id: &TxHash) -> bool {
        verify_signature(tx_id.as_bytes(), &self.signature, &self.by)
    }
}

/// A transition and the signatures gathered for it so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransition {
    pub transition: Transition,
    pub signatures: Vec<TransitionSignature>,
}

impl SignedTransition {
    pub fn new(transition: Transition) -> Self {
        Self {
            transition,
            signatures: Vec::new(),
        }
    }

    pub fn id(&self) -> TxHash {
        self.transition.id()
    }

    /// Attach a signature, replacing any earlier one by the same key.
    pub fn add_signature(&mut self, signature: TransitionSignature) {
        self.signatures.retain(|s| s.by != signature.by);
        self.signatures.push(signature);
    }

    /// Keys that have signed.
    pub fn signed_by(&self) -> BTreeSet<PublicKey> {
        self.signatures.iter().map(|s| s.by.clone()).collect()
    }

    /// Required signers whose signature is not yet attached.
    pub fn missing_signers(&self) -> Vec<&Party> {
        let signed = self.signed_by();
        self.transition
            .required_signers
            .iter()
            .filter(|p| !signed.contains(&p.key))
            .collect()
    }

    /// Check every attached signature, and that all required signers except
    /// those whose keys are in `allowed_missing` have signed.
    pub fn verify_signatures_except(
        &self,
        allowed_missing: &BTreeSet<PublicKey>,
    ) -> Result<(), SignatureError> {
        let tx_id = self.id();
        for sig in &self.signatures {
            let Some(signer) = self
                .transition
                .required_signers
                .iter()
                .find(|p| p.key == sig.by)
            else {
                return Err(SignatureError::Unexpected(sig.by.to_string()));
            };
            if !sig.is_valid_for(&tx_id) {
                return Err(SignatureError::Invalid {
                    party: signer.name.clone(),
                });
            }
        }

        let missing: Vec<String> = self
            .missing_signers()
            .into_iter()
            .filter(|p| !allowed_missing.contains(&p.key))
            .map(|p| p.name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SignatureError::Missing { parties: missing });
        }
        Ok(())
    }

    /// Check that the transition carries a valid signature from every required signer.
    pub fn verify_signatures(&self) -> Result<(), SignatureError> {
        self.verify_signatures_except(&BTreeSet::new())
    }
}

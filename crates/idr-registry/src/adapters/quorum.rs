//! # Quorum Validator
//!
//! A program controller that accepts a hash when at least `threshold` of its
//! keys signed it. The opaque blob is a concatenation of packed 65-byte
//! signatures; each signer counts once.

use crate::ports::outbound::ControllerValidator;
use idr_crypto::{EcdsaVerifier, SignaturePolicy, PACKED_SIGNATURE_LEN};
use idr_types::{Address, Hash};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct QuorumValidator {
    signers: HashSet<Address>,
    threshold: usize,
    verifier: EcdsaVerifier,
}

impl QuorumValidator {
    /// `None` if `threshold` is zero or exceeds the number of distinct signers.
    pub fn new(signers: impl IntoIterator<Item = Address>, threshold: usize) -> Option<Self> {
        let signers: HashSet<Address> = signers.into_iter().collect();
        if threshold == 0 || threshold > signers.len() {
            return None;
        }
        Some(Self {
            signers,
            threshold,
            verifier: EcdsaVerifier::new(),
        })
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SignaturePolicy) -> Self {
        self.verifier = EcdsaVerifier::with_policy(policy);
        self
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn is_signer(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }
}

impl ControllerValidator for QuorumValidator {
    fn is_valid(&self, hash: &Hash, signature: &[u8]) -> bool {
        if signature.is_empty() || signature.len() % PACKED_SIGNATURE_LEN != 0 {
            debug!(len = signature.len(), "Quorum blob is not a list of packed signatures");
            return false;
        }

        let mut approvals = HashSet::new();
        for chunk in signature.chunks_exact(PACKED_SIGNATURE_LEN) {
            match self.verifier.recover_packed(hash, chunk) {
                Ok(signer) if self.signers.contains(&signer) => {
                    if !approvals.insert(signer) {
                        debug!(%signer, "Duplicate quorum signature");
                        return false;
                    }
                }
                Ok(signer) => {
                    debug!(%signer, "Signature from outside the quorum");
                    return false;
                }
                Err(e) => {
                    debug!(error = %e, "Unrecoverable quorum signature");
                    return false;
                }
            }
        }

        approvals.len() >= self.threshold
    }
}

//! # Domain Entities
//!
//! Core data structures for signature recovery.

use super::errors::SignatureError;
use idr_types::Address;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

/// Length of a packed `r ‖ s ‖ v` signature.
pub const PACKED_SIGNATURE_LEN: usize = 65;

// =============================================================================
// ECDSA Types (secp256k1)
// =============================================================================

/// ECDSA signature on the secp256k1 curve.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// R component (32 bytes)
    #[serde_as(as = "Hex")]
    pub r: [u8; 32],
    /// S component (32 bytes)
    #[serde_as(as = "Hex")]
    pub s: [u8; 32],
    /// Recovery ID (0, 1, 27, or 28)
    pub v: u8,
}

impl EcdsaSignature {
    /// Builds a signature from its three components.
    pub fn new(v: u8, r: [u8; 32], s: [u8; 32]) -> Self {
        Self { r, s, v }
    }

    /// Parses a packed `r(32) ‖ s(32) ‖ v(1)` blob.
    pub fn from_packed(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != PACKED_SIGNATURE_LEN {
            return Err(SignatureError::InvalidLength {
                expected: PACKED_SIGNATURE_LEN,
                actual: bytes.len(),
            });
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    /// Serializes to the packed `r ‖ s ‖ v` layout.
    pub fn to_packed(&self) -> [u8; PACKED_SIGNATURE_LEN] {
        let mut out = [0u8; PACKED_SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }
}

/// How high-S signatures are treated.
///
/// `NormalizeHighS` replaces `s` with `n - s` and flips the recovery parity,
/// so both twins recover the same signer, as a plain `ecrecover` does.
/// `RejectHighS` follows EIP-2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignaturePolicy {
    RejectHighS,
    #[default]
    NormalizeHighS,
}

// =============================================================================
// Verification Result
// =============================================================================

/// Result of signature verification.
#[derive(Clone, Debug)]
pub struct VerificationResult {
    /// Whether the signature is valid
    pub valid: bool,
    /// The recovered address (if verification succeeded)
    pub recovered_address: Option<Address>,
    /// Error details (if verification failed)
    pub error: Option<SignatureError>,
}

impl VerificationResult {
    /// Create a successful verification result.
    pub fn valid(recovered_address: Address) -> Self {
        Self {
            valid: true,
            recovered_address: Some(recovered_address),
            error: None,
        }
    }

    /// Create a failed verification result.
    pub fn invalid(error: SignatureError) -> Self {
        Self {
            valid: false,
            recovered_address: None,
            error: Some(error),
        }
    }

    /// Converts into a `Result`, for callers that propagate with `?`.
    pub fn into_result(self) -> Result<Address, SignatureError> {
        match (self.recovered_address, self.error) {
            (Some(address), None) => Ok(address),
            (_, Some(error)) => Err(error),
            (None, None) => Err(SignatureError::RecoveryFailed),
        }
    }
}

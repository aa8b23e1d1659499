//! # ECDSA Recovery (secp256k1)
//!
//! Recovers the address that signed a 32-byte digest. Before recovery:
//!
//! - `r` and `s` lie in `[1, n-1]` and `r` is an x-coordinate on the curve.
//! - `s <= n/2`. A high `s` is folded back to `n - s` with the recovery id
//!   flipped, or refused under [`SignaturePolicy::RejectHighS`].
//! - Range comparisons run in constant time over `subtle::Choice`.

use super::entities::{EcdsaSignature, SignaturePolicy, VerificationResult};
use super::errors::SignatureError;
use idr_types::{Address, Hash};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::FromEncodedPoint;
use k256::{AffinePoint, EncodedPoint};
use sha3::{Digest, Keccak256};
use subtle::{Choice, ConstantTimeEq};

/// Curve order, `0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141`.
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// `floor(n / 2)`; the largest accepted `s`.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

// =============================================================================
// ECDSA VERIFIER
// =============================================================================

/// ECDSA signature verifier bound to a high-S policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaVerifier {
    policy: SignaturePolicy,
}

impl EcdsaVerifier {
    /// Create a verifier that normalizes high-S signatures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a verifier with an explicit high-S policy.
    pub fn with_policy(policy: SignaturePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SignaturePolicy {
        self.policy
    }

    /// Range-check, apply the high-S policy, then recover the signer.
    pub fn verify_ecdsa(&self, message_hash: &Hash, signature: &EcdsaSignature) -> VerificationResult {
        if !is_valid_scalar(&signature.r) || !is_valid_r_coordinate(&signature.r) {
            return VerificationResult::invalid(SignatureError::InvalidFormat);
        }

        if !is_valid_scalar(&signature.s) {
            return VerificationResult::invalid(SignatureError::InvalidFormat);
        }

        let normalized;
        let signature = if is_low_s(&signature.s) {
            signature
        } else {
            match self.policy {
                SignaturePolicy::RejectHighS => {
                    return VerificationResult::invalid(SignatureError::MalleableSignature)
                }
                SignaturePolicy::NormalizeHighS => match normalize_high_s(signature) {
                    Ok(sig) => {
                        normalized = sig;
                        &normalized
                    }
                    Err(e) => return VerificationResult::invalid(e),
                },
            }
        };

        match recover_address(message_hash, signature) {
            Ok(address) => VerificationResult::valid(address),
            Err(e) => VerificationResult::invalid(e),
        }
    }

    /// Verify an ECDSA signature and check that the recovered signer matches.
    pub fn verify_ecdsa_signer(
        &self,
        message_hash: &Hash,
        signature: &EcdsaSignature,
        expected: Address,
    ) -> VerificationResult {
        let result = self.verify_ecdsa(message_hash, signature);

        match result.recovered_address {
            Some(recovered) if recovered != expected => {
                VerificationResult::invalid(SignatureError::SignerMismatch {
                    expected,
                    actual: recovered,
                })
            }
            _ => result,
        }
    }

    /// Parse a packed 65-byte signature and recover its signer.
    pub fn recover_packed(&self, message_hash: &Hash, packed: &[u8]) -> Result<Address, SignatureError> {
        let signature = EcdsaSignature::from_packed(packed)?;
        self.verify_ecdsa(message_hash, &signature).into_result()
    }
}

// =============================================================================
// CORE FUNCTIONS
// =============================================================================

/// Recover the signer's address from a signature without range or
/// malleability pre-checks.
pub fn recover_address(
    message_hash: &Hash,
    signature: &EcdsaSignature,
) -> Result<Address, SignatureError> {
    use zeroize::Zeroize;

    let recovery_id = parse_recovery_id(signature.v)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);

    let sig = Signature::from_slice(&sig_bytes);
    sig_bytes.zeroize();
    let sig = sig.map_err(|_| SignatureError::InvalidFormat)?;

    let recovered_key = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derive the address of a public key: last 20 bytes of
/// `keccak256(x ‖ y)`.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    // Skip the 0x04 uncompressed prefix
    let hash = keccak256(&pubkey_bytes.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Address::new(address)
}

/// Invert S value: s' = n - s
pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_ORDER[i] as i32) - (s[i] as i32) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Fold a high-S signature onto its low-S twin. Negating S flips the
/// y-parity of R, so the recovery id flips with it.
fn normalize_high_s(signature: &EcdsaSignature) -> Result<EcdsaSignature, SignatureError> {
    let v = match signature.v {
        0 => 1,
        1 => 0,
        27 => 28,
        28 => 27,
        other => return Err(SignatureError::InvalidRecoveryId(other)),
    };
    Ok(EcdsaSignature {
        r: signature.r,
        s: invert_s(&signature.s),
        v,
    })
}

/// `s <= floor(n / 2)`, in constant time.
pub(crate) fn is_low_s(s: &[u8; 32]) -> bool {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for (s_byte, h_byte) in s.iter().zip(SECP256K1_HALF_ORDER.iter()) {
        let not_decided = !(less | greater);
        let byte_less = Choice::from((s_byte < h_byte) as u8);
        let byte_greater = Choice::from((s_byte > h_byte) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    (!greater).into()
}

/// Check if a scalar value is in valid range [1, n-1] for ECDSA.
///
/// Runs in constant time.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }

    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for (s_byte, n_byte) in scalar.iter().zip(SECP256K1_ORDER.iter()) {
        let not_decided = !(less | greater);
        let byte_less = Choice::from((s_byte < n_byte) as u8);
        let byte_greater = Choice::from((s_byte > n_byte) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    (!is_zero & less).into()
}

/// Validate that R is a valid x-coordinate on the secp256k1 curve.
///
/// Only about half of all field elements have a matching y on the curve.
fn is_valid_r_coordinate(r: &[u8; 32]) -> bool {
    let mut compressed = [0u8; 33];
    compressed[0] = 0x02; // Even y-parity
    compressed[1..].copy_from_slice(r);

    let encoded = match EncodedPoint::from_bytes(compressed) {
        Ok(e) => e,
        Err(_) => return false,
    };

    AffinePoint::from_encoded_point(&encoded).is_some().into()
}

/// Parse recovery ID from v value.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

// =============================================================================
// TEST HELPERS
// =============================================================================

/// Deterministic keys and signing for tests.
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use super::*;
    use k256::ecdsa::SigningKey;

    /// Generate a new random ECDSA keypair.
    pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let verifying_key = *signing_key.verifying_key();
        (signing_key, verifying_key)
    }

    /// Load a signing key from 32 raw bytes.
    ///
    /// # Panics
    ///
    /// If the bytes are not a valid non-zero scalar.
    pub fn signing_key_from_bytes(bytes: &[u8; 32]) -> SigningKey {
        SigningKey::from_slice(bytes).expect("valid secp256k1 scalar")
    }

    /// Deterministic key derived from a one-byte seed. Different seeds give
    /// different keys.
    pub fn signing_key(seed: u8) -> SigningKey {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x5A;
        bytes[30] = 0x01;
        bytes[31] = seed;
        signing_key_from_bytes(&bytes)
    }

    /// Address controlled by `key`.
    pub fn address_of(key: &SigningKey) -> Address {
        address_from_pubkey(key.verifying_key())
    }

    /// Sign a message hash, producing a low-S signature with v in {27, 28}.
    pub fn sign(message_hash: &Hash, private_key: &SigningKey) -> EcdsaSignature {
        let (sig, recid) = private_key
            .sign_prehash_recoverable(message_hash)
            .expect("signing failed");

        let sig_bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        let s_normalized = if is_low_s(&s) { s } else { invert_s(&s) };

        // S was inverted, flip recovery id
        let v = if s_normalized != s {
            if recid.to_byte() == 0 {
                28
            } else {
                27
            }
        } else {
            recid.to_byte() + 27
        };

        EcdsaSignature {
            r,
            s: s_normalized,
            v,
        }
    }

    /// Sign and return the packed 65-byte form.
    pub fn sign_packed(message_hash: &Hash, private_key: &SigningKey) -> Vec<u8> {
        sign(message_hash, private_key).to_packed().to_vec()
    }

    /// The high-S twin of a low-S signature (same signer, different bytes).
    pub fn high_s_twin(signature: &EcdsaSignature) -> EcdsaSignature {
        let v = match signature.v {
            27 => 28,
            28 => 27,
            0 => 1,
            _ => 0,
        };
        EcdsaSignature {
            r: signature.r,
            s: invert_s(&signature.s),
            v,
        }
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

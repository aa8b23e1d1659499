//! # Identity-Registry Crypto
//!
//! secp256k1 signature recovery and Keccak-256 hashing used by the registry's
//! signed operations.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure cryptographic logic, no I/O
//! - **Test helpers** (`test_helpers`, behind the `test-helpers` feature):
//!   deterministic keys and signing for downstream test suites
//!
//! ## Security Notes
//!
//! - **Scalar validation**: R and S must be in `[1, n-1]`, R must be a valid
//!   x-coordinate on the curve
//! - **Malleability**: high-S signatures are folded onto their low-S twin by
//!   default, matching a plain `ecrecover`; [`SignaturePolicy::RejectHighS`]
//!   refuses them as EIP-2 does
//! - Recovery never panics on attacker-controlled bytes

pub mod domain;

#[cfg(any(test, feature = "test-helpers"))]
pub use domain::ecdsa::test_helpers;

// Re-export public API
pub use domain::ecdsa::{address_from_pubkey, invert_s, keccak256, recover_address, EcdsaVerifier};
pub use domain::entities::{EcdsaSignature, SignaturePolicy, VerificationResult, PACKED_SIGNATURE_LEN};
pub use domain::errors::SignatureError;

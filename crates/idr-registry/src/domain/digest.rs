//! # Signing Digest
//!
//! ```text
//! digest = keccak256(0x19 ‖ 0x00 ‖ registry(20) ‖ uint256(nonce) ‖ identity(20) ‖ payload)
//! ```
//!
//! | Operation | payload |
//! |---|---|
//! | change owner | `"changeOwner"` ‖ newOwner(20) |
//! | add delegate | `"addDelegate"` ‖ type(32) ‖ delegate(20) ‖ uint256(validity) |
//! | revoke delegate | `"revokeDelegate"` ‖ type(32) ‖ delegate(20) |
//! | set attribute | `"setAttribute"` ‖ name(32) ‖ value ‖ uint256(validity) |
//! | revoke attribute | `"revokeAttribute"` ‖ name(32) ‖ value |
//!
//! The registry address separates domains: a digest for one registry instance
//! never matches another's.

use super::entities::Operation;
use idr_crypto::keccak256;
use idr_types::{uint256_word, Address, Hash};

/// Packed operation payload.
pub fn operation_payload(operation: &Operation) -> Vec<u8> {
    let mut out = Vec::with_capacity(128);
    match operation {
        Operation::ChangeOwner { new_owner } => {
            out.extend_from_slice(b"changeOwner");
            out.extend_from_slice(new_owner.as_bytes());
        }
        Operation::AddDelegate {
            delegate_type,
            delegate,
            validity,
        } => {
            out.extend_from_slice(b"addDelegate");
            out.extend_from_slice(delegate_type.as_bytes());
            out.extend_from_slice(delegate.as_bytes());
            out.extend_from_slice(&uint256_word(*validity));
        }
        Operation::RevokeDelegate {
            delegate_type,
            delegate,
        } => {
            out.extend_from_slice(b"revokeDelegate");
            out.extend_from_slice(delegate_type.as_bytes());
            out.extend_from_slice(delegate.as_bytes());
        }
        Operation::SetAttribute {
            name,
            value,
            validity,
        } => {
            out.extend_from_slice(b"setAttribute");
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(value);
            out.extend_from_slice(&uint256_word(*validity));
        }
        Operation::RevokeAttribute { name, value } => {
            out.extend_from_slice(b"revokeAttribute");
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(value);
        }
    }
    out
}

/// Digest the identity's controller must sign with its current `nonce`.
pub fn signing_digest(
    registry: &Address,
    nonce: u64,
    identity: &Address,
    operation: &Operation,
) -> Hash {
    let payload = operation_payload(operation);
    let mut preimage = Vec::with_capacity(2 + 20 + 32 + 20 + payload.len());
    preimage.push(0x19);
    preimage.push(0x00);
    preimage.extend_from_slice(registry.as_bytes());
    preimage.extend_from_slice(&uint256_word(nonce));
    preimage.extend_from_slice(identity.as_bytes());
    preimage.extend_from_slice(&payload);
    keccak256(&preimage)
}

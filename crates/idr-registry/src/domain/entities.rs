//! # Domain Entities
//!
//! Operations, authorization claims and the history events they produce.

use idr_crypto::EcdsaSignature;
use idr_types::{Address, AttributeName, DelegateType, Hash, Position, Timestamp};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

// =============================================================================
// OPERATIONS
// =============================================================================

/// One of the five mutating registry operations.
///
/// `validity` is a TTL in seconds added to the ledger time at application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    ChangeOwner {
        new_owner: Address,
    },
    AddDelegate {
        delegate_type: DelegateType,
        delegate: Address,
        validity: u64,
    },
    RevokeDelegate {
        delegate_type: DelegateType,
        delegate: Address,
    },
    SetAttribute {
        name: AttributeName,
        value: Vec<u8>,
        validity: u64,
    },
    RevokeAttribute {
        name: AttributeName,
        value: Vec<u8>,
    },
}

impl Operation {
    /// Snake-case name used in spans, logs and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChangeOwner { .. } => "change_owner",
            Self::AddDelegate { .. } => "add_delegate",
            Self::RevokeDelegate { .. } => "revoke_delegate",
            Self::SetAttribute { .. } => "set_attribute",
            Self::RevokeAttribute { .. } => "revoke_attribute",
        }
    }
}

// =============================================================================
// AUTHORIZATION CLAIMS
// =============================================================================

/// How the submitter proves it may act for the identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Claim {
    /// The controller is calling in person.
    Direct { caller: Address },
    /// Split `(v, r, s)` secp256k1 signature over the signing digest.
    RawSignature { v: u8, r: [u8; 32], s: [u8; 32] },
    /// Packed 65-byte `r ‖ s ‖ v` signature over the signing digest.
    PackedSignature { bytes: Vec<u8> },
    /// The controller is a program; its registered validator judges the blob.
    ControllerValidated { payload_hash: Hash, signature: Vec<u8> },
}

impl Claim {
    pub fn direct(caller: Address) -> Self {
        Self::Direct { caller }
    }

    pub fn signed(signature: &EcdsaSignature) -> Self {
        Self::RawSignature {
            v: signature.v,
            r: signature.r,
            s: signature.s,
        }
    }

    pub fn packed(bytes: impl Into<Vec<u8>>) -> Self {
        Self::PackedSignature {
            bytes: bytes.into(),
        }
    }

    pub fn program(payload_hash: Hash, signature: impl Into<Vec<u8>>) -> Self {
        Self::ControllerValidated {
            payload_hash,
            signature: signature.into(),
        }
    }

    /// Metric label for the authorization path.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::RawSignature { .. } | Self::PackedSignature { .. } => "signed",
            Self::ControllerValidated { .. } => "program",
        }
    }
}

// =============================================================================
// HISTORY EVENTS
// =============================================================================

/// An immutable change record handed to the ledger.
///
/// `previous_change` is the identity's changed pointer before this mutation;
/// `0` terminates the chain.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    #[serde(rename_all = "camelCase")]
    OwnerChanged {
        identity: Address,
        owner: Address,
        previous_change: Position,
    },
    #[serde(rename_all = "camelCase")]
    DelegateChanged {
        identity: Address,
        delegate_type: DelegateType,
        delegate: Address,
        valid_to: Timestamp,
        previous_change: Position,
    },
    #[serde(rename_all = "camelCase")]
    AttributeChanged {
        identity: Address,
        name: AttributeName,
        #[serde_as(as = "Hex")]
        value: Vec<u8>,
        valid_to: Timestamp,
        previous_change: Position,
    },
}

impl RegistryEvent {
    pub fn identity(&self) -> Address {
        match self {
            Self::OwnerChanged { identity, .. }
            | Self::DelegateChanged { identity, .. }
            | Self::AttributeChanged { identity, .. } => *identity,
        }
    }

    pub fn previous_change(&self) -> Position {
        match self {
            Self::OwnerChanged {
                previous_change, ..
            }
            | Self::DelegateChanged {
                previous_change, ..
            }
            | Self::AttributeChanged {
                previous_change, ..
            } => *previous_change,
        }
    }

    /// `None` for ownership changes, which carry no expiry.
    pub fn valid_to(&self) -> Option<Timestamp> {
        match self {
            Self::OwnerChanged { .. } => None,
            Self::DelegateChanged { valid_to, .. } | Self::AttributeChanged { valid_to, .. } => {
                Some(*valid_to)
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::OwnerChanged { .. } => "OwnerChanged",
            Self::DelegateChanged { .. } => "DelegateChanged",
            Self::AttributeChanged { .. } => "AttributeChanged",
        }
    }
}

/// Result of an accepted operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Ledger position the event was appended at.
    pub position: Position,
    /// Ledger time the operation was applied at.
    pub timestamp: Timestamp,
    pub event: RegistryEvent,
}

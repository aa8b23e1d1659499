//! # State Store
//!
//! Per-identity controller and changed pointer, per-key delegate expiry and
//! per-signer nonce. Absent entries read as their initial values, so
//! identities exist implicitly.
//!
//! Writes go through [`StateStore::commit`] with a list of [`StateChange`]s
//! computed ahead of time. The processor commits only after the ledger has
//! accepted the event, so a failed operation never touches the store.

use idr_types::{Address, DelegateType, Position, Timestamp};
use std::collections::HashMap;

/// Key of a delegate record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DelegateKey {
    pub identity: Address,
    pub delegate_type: DelegateType,
    pub delegate: Address,
}

/// A single pending write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateChange {
    SetController {
        identity: Address,
        controller: Address,
    },
    SetDelegate {
        key: DelegateKey,
        valid_to: Timestamp,
    },
    SetChanged {
        identity: Address,
        position: Position,
    },
    SetNonce {
        signer: Address,
        nonce: u64,
    },
}

#[derive(Debug, Default, Clone)]
pub struct StateStore {
    owners: HashMap<Address, Address>,
    delegates: HashMap<DelegateKey, Timestamp>,
    changed: HashMap<Address, Position>,
    nonces: HashMap<Address, u64>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored controller, or the identity itself.
    pub fn controller(&self, identity: &Address) -> Address {
        self.owners.get(identity).copied().unwrap_or(*identity)
    }

    /// The raw stored controller; `None` until the first transfer.
    pub fn stored_owner(&self, identity: &Address) -> Option<Address> {
        self.owners.get(identity).copied()
    }

    /// Raw delegate expiry; `0` if never set.
    pub fn delegate_expiry(&self, key: &DelegateKey) -> Timestamp {
        self.delegates.get(key).copied().unwrap_or(0)
    }

    pub fn changed(&self, identity: &Address) -> Position {
        self.changed.get(identity).copied().unwrap_or(0)
    }

    pub fn nonce(&self, signer: &Address) -> u64 {
        self.nonces.get(signer).copied().unwrap_or(0)
    }

    /// The nonce after `signer`'s next signed operation; `None` once the
    /// counter is exhausted.
    pub fn next_nonce(&self, signer: &Address) -> Option<u64> {
        self.nonce(signer).checked_add(1)
    }

    /// Applies every change in order.
    pub fn commit(&mut self, changes: &[StateChange]) {
        for change in changes {
            match *change {
                StateChange::SetController {
                    identity,
                    controller,
                } => {
                    self.owners.insert(identity, controller);
                }
                StateChange::SetDelegate { key, valid_to } => {
                    self.delegates.insert(key, valid_to);
                }
                StateChange::SetChanged { identity, position } => {
                    self.changed.insert(identity, position);
                }
                StateChange::SetNonce { signer, nonce } => {
                    self.nonces.insert(signer, nonce);
                }
            }
        }
    }
}

//! Shared fixtures: a registry on an in-memory ledger, well-known keys and
//! claim builders.

use idr_crypto::test_helpers::{address_of, sign, signing_key_from_bytes};
use idr_registry::domain::digest::signing_digest;
use idr_registry::{
    Claim, InMemoryLedger, Operation, ProgramControllers, RegistryConfig, RegistryService,
};
use idr_types::{Address, Bytes32};
use k256::ecdsa::SigningKey;
use std::sync::Arc;

/// Address the test registry is deployed at.
pub const REGISTRY_ADDRESS: Address = Address::new([
    0xdc, 0xa7, 0xef, 0x03, 0xe9, 0x8e, 0x0d, 0xc2, 0xb8, 0x55, 0xbe, 0x64, 0x7c, 0x39, 0xab, 0xe9,
    0x84, 0xfc, 0xf2, 0x1b,
]);

/// Ledger time at genesis.
pub const GENESIS_TIME: u64 = 1_700_000_000;

pub const DAY: u64 = 86_400;

pub type TestRegistry = RegistryService<Arc<InMemoryLedger>, ProgramControllers>;

/// Key whose address is `0x2036C6CD85692F0Fb2C26E6c6B2ECed9e4478Dfd`.
pub fn signer_key() -> SigningKey {
    key_from_hex("a285ab66393c5fdda46d6fbad9e27fafd438254ab72ad5acb681a0e9f20f5d7b")
}

/// Key whose address is `0xEA91e58E9Fa466786726F0a947e8583c7c5B3185`.
pub fn signer_key2() -> SigningKey {
    key_from_hex("a285ab66393c5fdda46d6fbad9e27fafd438254ab72ad5acb681a0e9f20f5d7a")
}

fn key_from_hex(hex_key: &str) -> SigningKey {
    let bytes: [u8; 32] = hex::decode(hex_key)
        .expect("valid hex")
        .try_into()
        .expect("32-byte key");
    signing_key_from_bytes(&bytes)
}

/// A plain account that only ever acts through direct calls.
pub fn account(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = 0xAC;
    bytes[19] = n;
    Address::new(bytes)
}

pub fn label(text: &str) -> Bytes32 {
    Bytes32::from_label(text).expect("label fits in 31 bytes")
}

pub fn addr(key: &SigningKey) -> Address {
    address_of(key)
}

/// Registry plus a handle on its ledger for clock and mining control.
pub struct Harness {
    pub registry: TestRegistry,
    pub ledger: Arc<InMemoryLedger>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::new(REGISTRY_ADDRESS))
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let ledger = Arc::new(InMemoryLedger::starting_at(GENESIS_TIME));
        let registry =
            RegistryService::with_directory(config, ledger.clone(), ProgramControllers::new());
        Self { registry, ledger }
    }

    /// `(v, r, s)` claim signed by `key` with the current nonce.
    pub fn signed(&self, identity: Address, operation: &Operation, key: &SigningKey) -> Claim {
        let digest = self.registry.signing_digest(identity, operation);
        Claim::signed(&sign(&digest, key))
    }

    /// `(v, r, s)` claim signed by `key` with an explicit nonce.
    pub fn signed_with_nonce(
        &self,
        identity: Address,
        operation: &Operation,
        key: &SigningKey,
        nonce: u64,
    ) -> Claim {
        let registry = self.registry.config().registry_address;
        let digest = signing_digest(&registry, nonce, &identity, operation);
        Claim::signed(&sign(&digest, key))
    }

    pub fn now(&self) -> u64 {
        use idr_registry::Ledger;
        self.ledger.current_time()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_keys() {
        assert_eq!(
            addr(&signer_key()),
            "0x2036C6CD85692F0Fb2C26E6c6B2ECed9e4478Dfd".parse().unwrap()
        );
        assert_eq!(
            addr(&signer_key2()),
            "0xEA91e58E9Fa466786726F0a947e8583c7c5B3185".parse().unwrap()
        );
    }

    #[test]
    fn test_accounts_are_distinct() {
        assert_ne!(account(1), account(2));
        assert_ne!(account(1), addr(&signer_key()));
    }
}

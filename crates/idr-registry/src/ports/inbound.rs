//! # Driving Ports (API - Inbound)
//!
//! The public interface of the registry.

use crate::domain::entities::{Claim, Receipt};
use crate::domain::errors::RegistryError;
use idr_types::{Address, AttributeName, DelegateType, Position};

/// Identity registry API.
///
/// Queries never fail. Mutations return the [`Receipt`] of the appended event,
/// or the reason nothing happened.
pub trait IdentityRegistryApi {
    /// Current controller: the stored owner, or the identity itself.
    fn identity_owner(&self, identity: Address) -> Address;

    /// Position of the identity's latest change; `0` if never changed.
    fn changed(&self, identity: Address) -> Position;

    /// Replay nonce of a signer.
    fn nonce(&self, signer: Address) -> u64;

    /// Whether `delegate` holds an unexpired delegation of `delegate_type`.
    fn valid_delegate(
        &self,
        identity: Address,
        delegate_type: DelegateType,
        delegate: Address,
    ) -> bool;

    fn change_owner(
        &mut self,
        identity: Address,
        new_owner: Address,
        claim: Claim,
    ) -> Result<Receipt, RegistryError>;

    fn add_delegate(
        &mut self,
        identity: Address,
        delegate_type: DelegateType,
        delegate: Address,
        validity: u64,
        claim: Claim,
    ) -> Result<Receipt, RegistryError>;

    fn revoke_delegate(
        &mut self,
        identity: Address,
        delegate_type: DelegateType,
        delegate: Address,
        claim: Claim,
    ) -> Result<Receipt, RegistryError>;

    fn set_attribute(
        &mut self,
        identity: Address,
        name: AttributeName,
        value: Vec<u8>,
        validity: u64,
        claim: Claim,
    ) -> Result<Receipt, RegistryError>;

    fn revoke_attribute(
        &mut self,
        identity: Address,
        name: AttributeName,
        value: Vec<u8>,
        claim: Claim,
    ) -> Result<Receipt, RegistryError>;
}

//! # Authorization Engine
//!
//! Resolves who controls an identity and judges a [`Claim`] against that
//! controller. Every signature variant is dispatched here; the processor only
//! sees "authorized" or an [`AuthorizationError`].

use super::digest::signing_digest;
use super::entities::{Claim, Operation};
use super::errors::AuthorizationError;
use super::state::StateStore;
use crate::ports::outbound::ControllerDirectory;
use idr_crypto::{EcdsaSignature, EcdsaVerifier, SignaturePolicy};
use idr_types::{Address, Hash};
use tracing::debug;

/// A claim that passed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Authorization {
    /// The controller the claim was checked against.
    pub controller: Address,
    /// Signer whose nonce the operation consumes, if it was signed.
    pub nonce_signer: Option<Address>,
}

#[derive(Debug, Clone, Copy)]
pub struct AuthorizationEngine {
    registry: Address,
    verifier: EcdsaVerifier,
}

impl AuthorizationEngine {
    pub fn new(registry: Address, policy: SignaturePolicy) -> Self {
        Self {
            registry,
            verifier: EcdsaVerifier::with_policy(policy),
        }
    }

    pub fn registry(&self) -> Address {
        self.registry
    }

    /// The stored controller or the identity itself. Never fails.
    pub fn resolve_controller(&self, state: &StateStore, identity: &Address) -> Address {
        state.controller(identity)
    }

    /// Digest the current controller must sign for `operation`.
    pub fn digest(&self, state: &StateStore, identity: &Address, operation: &Operation) -> Hash {
        let controller = self.resolve_controller(state, identity);
        signing_digest(&self.registry, state.nonce(&controller), identity, operation)
    }

    /// Judge `claim` for `operation` on `identity`. Reads state, never writes.
    pub fn authorize<D: ControllerDirectory + ?Sized>(
        &self,
        state: &StateStore,
        directory: &D,
        identity: &Address,
        operation: &Operation,
        claim: &Claim,
    ) -> Result<Authorization, AuthorizationError> {
        let controller = self.resolve_controller(state, identity);

        match claim {
            Claim::Direct { caller } => {
                if *caller != controller {
                    return Err(AuthorizationError::BadActor);
                }
                Ok(Authorization {
                    controller,
                    nonce_signer: None,
                })
            }
            Claim::RawSignature { v, r, s } => {
                let signature = EcdsaSignature::new(*v, *r, *s);
                self.check_signature(state, identity, operation, controller, &signature)
            }
            Claim::PackedSignature { bytes } => {
                let signature = EcdsaSignature::from_packed(bytes).map_err(|e| {
                    debug!(error = %e, "Malformed packed signature");
                    AuthorizationError::BadSignature
                })?;
                self.check_signature(state, identity, operation, controller, &signature)
            }
            Claim::ControllerValidated {
                payload_hash,
                signature,
            } => {
                let expected = self.digest(state, identity, operation);
                if *payload_hash != expected {
                    debug!("Program claim hash does not match the signing digest");
                    return Err(AuthorizationError::BadSignature);
                }
                let validator = directory.validator_for(&controller).ok_or_else(|| {
                    debug!(%controller, "Controller has no registered validator");
                    AuthorizationError::BadSignature
                })?;
                if !validator.is_valid(payload_hash, signature) {
                    return Err(AuthorizationError::BadSignature);
                }
                Ok(Authorization {
                    controller,
                    nonce_signer: Some(controller),
                })
            }
        }
    }

    fn check_signature(
        &self,
        state: &StateStore,
        identity: &Address,
        operation: &Operation,
        controller: Address,
        signature: &EcdsaSignature,
    ) -> Result<Authorization, AuthorizationError> {
        let digest = signing_digest(&self.registry, state.nonce(&controller), identity, operation);

        self.verifier
            .verify_ecdsa_signer(&digest, signature, controller)
            .into_result()
            .map_err(|e| {
                debug!(error = %e, "Signature rejected");
                AuthorizationError::BadSignature
            })?;

        Ok(Authorization {
            controller,
            nonce_signer: Some(controller),
        })
    }
}

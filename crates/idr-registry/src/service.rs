//! # Registry Service
//!
//! The operation processor. Each mutating call runs one atomic step:
//!
//! 1. authorize the claim against the current controller
//! 2. check the operation's own precondition (no self-transfer)
//! 3. read the ledger's next position and time
//! 4. build the event with `previous_change = changed(identity)`
//! 5. append the event to the ledger
//! 6. commit the state delta (controller, delegate expiry, changed pointer,
//!    nonce)
//!
//! Any failure before step 6 leaves the state store untouched.

use crate::adapters::NoProgramControllers;
use crate::config::RegistryConfig;
use crate::domain::authorization::AuthorizationEngine;
use crate::domain::entities::{Claim, Operation, Receipt, RegistryEvent};
use crate::domain::errors::{AuthorizationError, HistoryError, RegistryError};
use crate::domain::history::{self, ActiveAttribute};
use crate::domain::state::{DelegateKey, StateChange, StateStore};
use crate::ports::inbound::IdentityRegistryApi;
use crate::ports::outbound::{ControllerDirectory, HistorySource, Ledger};
use idr_telemetry::{metric_inc, NONCES_CONSUMED, REGISTRY_OPERATIONS, REGISTRY_REJECTIONS};
use idr_types::{Address, AttributeName, DelegateType, Hash, Position, Timestamp};
use tracing::{debug, instrument, warn};

/// Statistics for the registry service.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServiceStats {
    /// Operations accepted and appended.
    pub operations_applied: u64,
    /// Accepted operations that consumed a nonce.
    pub signed_operations: u64,
    pub rejected_bad_actor: u64,
    pub rejected_bad_signature: u64,
    /// Operations authorized but refused by the ledger.
    pub ledger_failures: u64,
}

/// The identity registry.
///
/// Single writer: mutations take `&mut self`, queries take `&self`.
pub struct RegistryService<L: Ledger, D: ControllerDirectory = NoProgramControllers> {
    config: RegistryConfig,
    engine: AuthorizationEngine,
    state: StateStore,
    ledger: L,
    directory: D,
    stats: ServiceStats,
}

impl<L: Ledger> RegistryService<L, NoProgramControllers> {
    /// Registry without program controllers.
    pub fn new(config: RegistryConfig, ledger: L) -> Self {
        Self::with_directory(config, ledger, NoProgramControllers)
    }
}

impl<L: Ledger, D: ControllerDirectory> RegistryService<L, D> {
    pub fn with_directory(config: RegistryConfig, ledger: L, directory: D) -> Self {
        Self {
            engine: AuthorizationEngine::new(config.registry_address, config.signature_policy),
            config,
            state: StateStore::new(),
            ledger,
            directory,
            stats: ServiceStats::default(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut D {
        &mut self.directory
    }

    pub fn stats(&self) -> ServiceStats {
        self.stats
    }

    /// Raw stored controller; `None` until the first transfer.
    pub fn owners(&self, identity: Address) -> Option<Address> {
        self.state.stored_owner(&identity)
    }

    /// Raw delegate expiry; `0` if never set.
    pub fn delegates(
        &self,
        identity: Address,
        delegate_type: DelegateType,
        delegate: Address,
    ) -> Timestamp {
        self.state.delegate_expiry(&DelegateKey {
            identity,
            delegate_type,
            delegate,
        })
    }

    /// Digest the identity's controller must sign for `operation` right now.
    pub fn signing_digest(&self, identity: Address, operation: &Operation) -> Hash {
        self.engine.digest(&self.state, &identity, operation)
    }

    /// Authorize and apply one operation.
    #[instrument(
        skip_all,
        fields(identity = %identity, operation = operation.name(), authorization = claim.path())
    )]
    pub fn apply(
        &mut self,
        identity: Address,
        operation: Operation,
        claim: Claim,
    ) -> Result<Receipt, RegistryError> {
        let operation_name = operation.name();

        match self.try_apply(identity, operation, &claim) {
            Ok(receipt) => {
                self.stats.operations_applied += 1;
                metric_inc!(REGISTRY_OPERATIONS, &[operation_name, claim.path()]);
                debug!(
                    position = receipt.position,
                    previous_change = receipt.event.previous_change(),
                    event = receipt.event.kind(),
                    "Operation applied"
                );
                Ok(receipt)
            }
            Err(e) => {
                match &e {
                    RegistryError::Unauthorized(AuthorizationError::BadActor) => {
                        self.stats.rejected_bad_actor += 1
                    }
                    RegistryError::Unauthorized(AuthorizationError::BadSignature) => {
                        self.stats.rejected_bad_signature += 1
                    }
                    RegistryError::Ledger(_) => self.stats.ledger_failures += 1,
                }
                metric_inc!(REGISTRY_REJECTIONS, &[operation_name, e.reason()]);
                warn!(reason = e.reason(), error = %e, "Operation rejected");
                Err(e)
            }
        }
    }

    fn try_apply(
        &mut self,
        identity: Address,
        operation: Operation,
        claim: &Claim,
    ) -> Result<Receipt, RegistryError> {
        let authorization =
            self.engine
                .authorize(&self.state, &self.directory, &identity, &operation, claim)?;

        if let Operation::ChangeOwner { new_owner } = &operation {
            if *new_owner == authorization.controller {
                return Err(AuthorizationError::BadActor.into());
            }
        }

        let nonce_change = match authorization.nonce_signer {
            Some(signer) => {
                let nonce = self.state.next_nonce(&signer).ok_or_else(|| {
                    warn!(%signer, "Nonce exhausted");
                    AuthorizationError::BadSignature
                })?;
                Some(StateChange::SetNonce { signer, nonce })
            }
            None => None,
        };

        let position = self.ledger.next_position();
        let now = self.ledger.current_time();
        let previous_change = self.state.changed(&identity);
        let mut changes = Vec::with_capacity(3);

        let event = match operation {
            Operation::ChangeOwner { new_owner } => {
                changes.push(StateChange::SetController {
                    identity,
                    controller: new_owner,
                });
                RegistryEvent::OwnerChanged {
                    identity,
                    owner: new_owner,
                    previous_change,
                }
            }
            Operation::AddDelegate {
                delegate_type,
                delegate,
                validity,
            } => {
                let valid_to = now.saturating_add(validity);
                changes.push(StateChange::SetDelegate {
                    key: DelegateKey {
                        identity,
                        delegate_type,
                        delegate,
                    },
                    valid_to,
                });
                RegistryEvent::DelegateChanged {
                    identity,
                    delegate_type,
                    delegate,
                    valid_to,
                    previous_change,
                }
            }
            Operation::RevokeDelegate {
                delegate_type,
                delegate,
            } => {
                changes.push(StateChange::SetDelegate {
                    key: DelegateKey {
                        identity,
                        delegate_type,
                        delegate,
                    },
                    valid_to: now,
                });
                RegistryEvent::DelegateChanged {
                    identity,
                    delegate_type,
                    delegate,
                    valid_to: now,
                    previous_change,
                }
            }
            Operation::SetAttribute {
                name,
                value,
                validity,
            } => RegistryEvent::AttributeChanged {
                identity,
                name,
                value,
                valid_to: now.saturating_add(validity),
                previous_change,
            },
            Operation::RevokeAttribute { name, value } => RegistryEvent::AttributeChanged {
                identity,
                name,
                value,
                valid_to: 0,
                previous_change,
            },
        };

        changes.push(StateChange::SetChanged { identity, position });
        changes.extend(nonce_change);

        self.ledger.append(event.clone())?;
        self.state.commit(&changes);

        if authorization.nonce_signer.is_some() {
            self.stats.signed_operations += 1;
            metric_inc!(NONCES_CONSUMED);
        }

        Ok(Receipt {
            position,
            timestamp: now,
            event,
        })
    }
}

impl<L: Ledger + HistorySource, D: ControllerDirectory> RegistryService<L, D> {
    /// Full change history of `identity`, most recent first.
    pub fn history(&self, identity: Address) -> Result<Vec<RegistryEvent>, HistoryError> {
        history::walk_history(&self.ledger, &identity, self.state.changed(&identity))
    }

    /// Attributes of `identity` valid at the current ledger time.
    pub fn active_attributes(&self, identity: Address) -> Result<Vec<ActiveAttribute>, HistoryError> {
        let events = self.history(identity)?;
        Ok(history::active_attributes(
            &events,
            self.ledger.current_time(),
        ))
    }
}

impl<L: Ledger, D: ControllerDirectory> IdentityRegistryApi for RegistryService<L, D> {
    fn identity_owner(&self, identity: Address) -> Address {
        self.engine.resolve_controller(&self.state, &identity)
    }

    fn changed(&self, identity: Address) -> Position {
        self.state.changed(&identity)
    }

    fn nonce(&self, signer: Address) -> u64 {
        self.state.nonce(&signer)
    }

    fn valid_delegate(
        &self,
        identity: Address,
        delegate_type: DelegateType,
        delegate: Address,
    ) -> bool {
        self.delegates(identity, delegate_type, delegate) > self.ledger.current_time()
    }

    fn change_owner(
        &mut self,
        identity: Address,
        new_owner: Address,
        claim: Claim,
    ) -> Result<Receipt, RegistryError> {
        self.apply(identity, Operation::ChangeOwner { new_owner }, claim)
    }

    fn add_delegate(
        &mut self,
        identity: Address,
        delegate_type: DelegateType,
        delegate: Address,
        validity: u64,
        claim: Claim,
    ) -> Result<Receipt, RegistryError> {
        self.apply(
            identity,
            Operation::AddDelegate {
                delegate_type,
                delegate,
                validity,
            },
            claim,
        )
    }

    fn revoke_delegate(
        &mut self,
        identity: Address,
        delegate_type: DelegateType,
        delegate: Address,
        claim: Claim,
    ) -> Result<Receipt, RegistryError> {
        self.apply(
            identity,
            Operation::RevokeDelegate {
                delegate_type,
                delegate,
            },
            claim,
        )
    }

    fn set_attribute(
        &mut self,
        identity: Address,
        name: AttributeName,
        value: Vec<u8>,
        validity: u64,
        claim: Claim,
    ) -> Result<Receipt, RegistryError> {
        self.apply(
            identity,
            Operation::SetAttribute {
                name,
                value,
                validity,
            },
            claim,
        )
    }

    fn revoke_attribute(
        &mut self,
        identity: Address,
        name: AttributeName,
        value: Vec<u8>,
        claim: Claim,
    ) -> Result<Receipt, RegistryError> {
        self.apply(identity, Operation::RevokeAttribute { name, value }, claim)
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

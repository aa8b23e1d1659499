//! # Identity-Registry Engine
//!
//! Binds identities to controllers and lets controllers delegate authority or
//! publish time-bounded attributes. Every mutation is authorized by a direct
//! call from the controller, by the controller's secp256k1 signature, or by a
//! program controller's own validator.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): state store, signing digests, authorization,
//!   history walking. No I/O.
//! - **Ports** (`ports/`): the inbound registry API and the outbound ledger,
//!   history and controller-validator traits.
//! - **Adapters** (`adapters/`): in-memory ledger and program-controller
//!   directory.
//! - **Service** (`service.rs`): the operation processor.
//!
//! ## Atomicity
//!
//! Each operation computes its state delta, appends exactly one event to the
//! ledger and only then commits the delta. A rejected operation or a failed
//! append leaves no trace, including the signer's nonce.
//!
//! ## History
//!
//! Only the position of an identity's latest change is stored. Each event
//! carries `previous_change`, so readers walk backwards from
//! [`RegistryService::changed`] to reconstruct the full history.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryLedger, NoProgramControllers, ProgramControllers, QuorumValidator};
pub use config::RegistryConfig;
pub use domain::entities::{Claim, Operation, Receipt, RegistryEvent};
pub use domain::errors::{AuthorizationError, HistoryError, LedgerError, RegistryError};
pub use domain::history::{active_attributes, walk_history, ActiveAttribute};
pub use ports::inbound::IdentityRegistryApi;
pub use ports::outbound::{ControllerDirectory, ControllerValidator, HistorySource, Ledger};
pub use service::{RegistryService, ServiceStats};

pub use idr_crypto::SignaturePolicy;
pub use idr_types::{Address, AttributeName, Bytes32, DelegateType, Hash, Position, Timestamp};

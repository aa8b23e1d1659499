//! # Driven Ports (Outbound)
//!
//! Collaborators the registry depends on:
//! - Ledger: positions, time and durable event append
//! - History source: events by position, for history readers
//! - Controller validators: signature judges for program controllers

use crate::domain::entities::RegistryEvent;
use crate::domain::errors::LedgerError;
use idr_types::{Address, Hash, Position, Timestamp};
use std::sync::Arc;

// =============================================================================
// LEDGER
// =============================================================================

/// Append-only ledger that orders accepted operations.
///
/// Positions are monotonic. Several appends may share a position when the
/// ledger batches operations.
pub trait Ledger {
    /// Position the next appended event will land at.
    fn next_position(&self) -> Position;

    /// Current ledger time in seconds.
    fn current_time(&self) -> Timestamp;

    /// Durably append `event` at [`next_position`](Self::next_position).
    fn append(&self, event: RegistryEvent) -> Result<(), LedgerError>;
}

impl<L: Ledger + ?Sized> Ledger for Arc<L> {
    fn next_position(&self) -> Position {
        (**self).next_position()
    }

    fn current_time(&self) -> Timestamp {
        (**self).current_time()
    }

    fn append(&self, event: RegistryEvent) -> Result<(), LedgerError> {
        (**self).append(event)
    }
}

// =============================================================================
// HISTORY SOURCE
// =============================================================================

/// Read access to appended events.
pub trait HistorySource {
    /// Events for `identity` at `position`, in append order.
    fn events_at(
        &self,
        position: Position,
        identity: &Address,
    ) -> Result<Vec<RegistryEvent>, LedgerError>;
}

impl<H: HistorySource + ?Sized> HistorySource for Arc<H> {
    fn events_at(
        &self,
        position: Position,
        identity: &Address,
    ) -> Result<Vec<RegistryEvent>, LedgerError> {
        (**self).events_at(position, identity)
    }
}

// =============================================================================
// PROGRAM CONTROLLERS
// =============================================================================

/// Validation logic of a controller that is a program rather than a key.
///
/// The registry accepts the verdict without inspecting the signature.
pub trait ControllerValidator: Send + Sync {
    fn is_valid(&self, hash: &Hash, signature: &[u8]) -> bool;
}

/// Finds the validator for a program controller.
pub trait ControllerDirectory {
    /// `None` when `controller` is not a registered program.
    fn validator_for(&self, controller: &Address) -> Option<&dyn ControllerValidator>;
}

//! # Adapters Layer
//!
//! Concrete implementations of the outbound ports.

pub mod controllers;
pub mod ledger;
pub mod quorum;

pub use controllers::{NoProgramControllers, ProgramControllers};
pub use ledger::{InMemoryLedger, MiningMode};
pub use quorum::QuorumValidator;

//! # Shared Types Crate
//!
//! Value objects used across the Identity-Registry workspace.
//!
//! ## Design Principles
//!
//! - **Fixed-size identifiers**: identities, controllers, delegates and signers
//!   are all 20-byte [`Address`] values.
//! - **Ledger coordinates are plain integers**: a [`Position`] of `0` means
//!   "never changed"; a [`Timestamp`] is seconds on the ledger clock.
//! - **Labels are bytes32**: delegate types and attribute names are 32-byte
//!   right-padded UTF-8 strings.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;

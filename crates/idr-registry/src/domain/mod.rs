//! # Domain Layer
//!
//! Pure registry logic with no I/O dependencies.

pub mod authorization;
pub mod digest;
pub mod entities;
pub mod errors;
pub mod history;
pub mod state;

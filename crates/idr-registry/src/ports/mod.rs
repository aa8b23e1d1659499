//! # Ports Layer
//!
//! - `inbound`: the API the registry offers
//! - `outbound`: the collaborators the registry depends on

pub mod inbound;
pub mod outbound;

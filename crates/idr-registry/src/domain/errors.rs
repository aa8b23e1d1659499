//! # Registry Errors

use idr_types::Position;
use thiserror::Error;

/// Why an operation was not authorized.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    /// Direct caller is not the controller, or a no-op self-transfer.
    #[error("bad_actor")]
    BadActor,

    /// Signature recovery or program validation failed (wrong key, wrong
    /// nonce, malformed bytes, validator said no).
    #[error("bad_signature")]
    BadSignature,
}

impl AuthorizationError {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadActor => "bad_actor",
            Self::BadSignature => "bad_signature",
        }
    }
}

/// Failures reported by the ledger collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Ledger rejected event: {reason}")]
    Rejected { reason: String },
}

/// Errors returned by mutating registry operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl RegistryError {
    pub fn is_bad_actor(&self) -> bool {
        matches!(self, Self::Unauthorized(AuthorizationError::BadActor))
    }

    pub fn is_bad_signature(&self) -> bool {
        matches!(self, Self::Unauthorized(AuthorizationError::BadSignature))
    }

    /// Stable label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized(e) => e.as_str(),
            Self::Ledger(_) => "ledger",
        }
    }
}

/// Errors raised while walking an identity's change history.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryError {
    /// The chain points at a position holding no event for the identity.
    #[error("No event for identity at position {position}")]
    MissingEvents { position: Position },

    /// An event links forward or to itself instead of strictly backwards.
    #[error("Broken history link at position {position}: previous change {previous}")]
    BrokenLink { position: Position, previous: Position },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

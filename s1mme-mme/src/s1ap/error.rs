//! S1AP handler errors

use thiserror::Error;

use s1mme_s1ap::S1apCodecError;

use super::directory::DirectoryError;
use super::events::ReleaseCause;

/// Result of an S1AP procedure handler or generator.
#[derive(Debug, Error)]
pub enum S1apError {
    /// PDU could not be decoded, nothing was handled
    #[error("Decode error: {0}")]
    Decode(String),

    /// Outbound PDU could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// No eNB on the association
    #[error("Unknown SCTP association: {0}")]
    UnknownAssociation(u32),

    /// UE could not be resolved
    #[error("Unknown UE: {0}")]
    UnknownUe(String),

    /// No eNB with this eNB id
    #[error("Unknown eNB id: {0:#x}")]
    UnknownEnb(u32),

    /// Message content rejected
    #[error("Validation error: {0}")]
    Validation(String),

    /// Message not acceptable in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// eNB/UE bookkeeping diverged; the process must restart
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Release cause with no wire representation
    #[error("Unsupported release cause: {0}")]
    UnsupportedCause(ReleaseCause),

    /// No handler for the procedure code and direction
    #[error("Dispatch error: {0}")]
    Dispatch(String),
}

impl S1apError {
    /// True for errors after which the core must not keep running.
    pub fn is_fatal(&self) -> bool {
        matches!(self, S1apError::InvariantViolation(_))
    }
}

impl From<S1apCodecError> for S1apError {
    fn from(e: S1apCodecError) -> Self {
        match e {
            S1apCodecError::EncodeError(msg) => S1apError::Encode(msg),
            S1apCodecError::DecodeError(msg) => S1apError::Decode(msg),
        }
    }
}

impl From<DirectoryError> for S1apError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::UnknownAssociation(assoc_id) => S1apError::UnknownAssociation(assoc_id),
            DirectoryError::DuplicateUe { .. } => S1apError::Validation(e.to_string()),
            DirectoryError::Snapshot(_) => S1apError::InvalidState(e.to_string()),
        }
    }
}

//! Hub error types.

use crate::crypto::SessionId;
use crate::protocol::EngineId;
use rps_core::{AccountId, TransferError};
use thiserror::Error;

/// Errors from ledger, session and admin operations.
///
/// Every error leaves ledger balances and session records exactly as they
/// were before the rejected call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("Account {0} is not authorized for this operation")]
    Unauthorized(AccountId),

    #[error("Session {0} already exists")]
    SessionAlreadyExists(SessionId),

    #[error("Session {0} is not waiting for this step")]
    NotInitiated(SessionId),

    #[error("Session {0} has expired")]
    SessionExpired(SessionId),

    #[error("Session {0} has not expired yet")]
    NotExpired(SessionId),

    #[error("Revealed move does not match the stored commitment")]
    CommitmentMismatch,

    #[error("Move already revealed in session {0}")]
    AlreadyRevealed(SessionId),

    #[error("Session {0} not found")]
    NoSuchSession(SessionId),

    #[error("Engine {0} not found")]
    NoSuchEngine(EngineId),

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("External transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("A session needs two distinct participants")]
    InvalidParticipants,

    #[error("Session expiration period must be positive")]
    InvalidExpirationPeriod,

    #[error("Time can only move forward")]
    InvalidTimeStep,
}

impl HubError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            HubError::InsufficientFunds { .. } => "insufficient_funds",
            HubError::Unauthorized(_) => "unauthorized",
            HubError::SessionAlreadyExists(_) => "session_already_exists",
            HubError::NotInitiated(_) => "not_initiated",
            HubError::SessionExpired(_) => "session_expired",
            HubError::NotExpired(_) => "not_expired",
            HubError::CommitmentMismatch => "commitment_mismatch",
            HubError::AlreadyRevealed(_) => "already_revealed",
            HubError::NoSuchSession(_) => "no_such_session",
            HubError::NoSuchEngine(_) => "no_such_engine",
            HubError::Overflow => "overflow",
            HubError::TransferFailed(_) => "transfer_failed",
            HubError::InvalidParticipants => "invalid_participants",
            HubError::InvalidExpirationPeriod => "invalid_expiration_period",
            HubError::InvalidTimeStep => "invalid_time_step",
        }
    }
}

/// Result type for hub operations
pub type HubResult<T> = Result<T, HubError>;

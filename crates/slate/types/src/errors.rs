//! Error types for slate operations

use crate::{ApplicationId, ApplicationStatus, BilletId, UserId};

/// Errors that can occur in slate operations.
///
/// Policy rejections (slate full, sandbox mode, ineligible billet) are not
/// errors; they are reported as outcomes by the engine.
#[derive(Debug, thiserror::Error)]
pub enum SlateError {
    #[error("Application not found: {0}")]
    ApplicationNotFound(ApplicationId),

    #[error("No live application for billet {0}")]
    NotOnSlate(BilletId),

    #[error("Application {application_id} is not owned by {user_id}")]
    NotOwner {
        application_id: ApplicationId,
        user_id: UserId,
    },

    #[error("Withdrawal not permitted for {application_id} in status {status}")]
    WithdrawalNotPermitted {
        application_id: ApplicationId,
        status: ApplicationStatus,
    },

    #[error("Invalid transition for {application_id}: {from} -> {to}")]
    InvalidTransition {
        application_id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("Session holds live applications for {owner}; cannot load ledgers for {user_id}")]
    SessionConflict { user_id: UserId, owner: UserId },

    #[error("Invalid rank {rank}: slate holds {live} live applications")]
    InvalidRank { rank: u32, live: usize },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for slate operations.
pub type SlateResult<T> = Result<T, SlateError>;

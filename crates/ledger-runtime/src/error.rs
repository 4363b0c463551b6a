//! Runtime error types

use ledger_core::{LedgerError, TransferError};
use thiserror::Error;

/// Errors raised while driving a workload
#[derive(Error, Debug)]
pub enum RunError {
    /// Building or configuring the ledger failed
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A transfer sent to the mailbox was refused
    #[error("Transfer refused: {0}")]
    Refused(#[from] TransferError),

    /// An operation task panicked or was aborted
    #[error("Operation task failed: {0}")]
    TaskFailed(String),

    /// The run exceeded its watchdog
    #[error("Run did not finish within {duration_ms}ms")]
    Watchdog { duration_ms: u64 },

    /// The final total differs from the initial one
    #[error("Conservation violated: expected {expected}, got {actual}")]
    ConservationViolated { expected: i64, actual: i64 },

    /// An account ended below zero
    #[error("Account {index} ended with negative balance {balance}")]
    NegativeBalance { index: usize, balance: i64 },

    /// The mailbox task is gone
    #[error("Mailbox closed")]
    MailboxClosed,
}

impl RunError {
    /// Check whether this is an ordinary transfer refusal
    pub fn is_refusal(&self) -> bool {
        matches!(self, RunError::Refused(_))
    }
}

impl From<tokio::task::JoinError> for RunError {
    fn from(err: tokio::task::JoinError) -> Self {
        RunError::TaskFailed(err.to_string())
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RunError>;

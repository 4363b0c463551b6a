//! Error types for the ledger
//!
//! [`TransferError`] is the refusal reason of a single transfer attempt and is
//! expected during normal operation. [`LedgerError`] covers construction and
//! configuration failures.

use thiserror::Error;

/// Why a transfer was refused. State is unchanged whenever one is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    /// Source and destination are the same account
    #[error("Cannot transfer from account {index} to itself")]
    SameAccount { index: usize },

    /// Source balance is below the requested amount
    #[error("Insufficient funds: have {available}, need {required}")]
    InsufficientFunds { available: i64, required: i64 },

    /// Amount is zero or negative
    #[error("Transfer amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    /// Index outside `[0, len)`
    #[error("Unknown account {index} (ledger has {len} accounts)")]
    UnknownAccount { index: usize, len: usize },
}

impl TransferError {
    /// Refusals caused by the source balance, as opposed to bad input
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, TransferError::InsufficientFunds { .. })
    }
}

/// Main error type for building and configuring a ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(String),

    /// An account would start below zero
    #[error("Account {index} has negative initial balance {balance}")]
    NegativeBalance { index: usize, balance: i64 },

    /// Sum of initial balances does not fit in an i64
    #[error("Total balance overflows i64 for {accounts} accounts of {initial_balance}")]
    BalanceOverflow { accounts: usize, initial_balance: i64 },

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O failure while loading configuration
    #[error("I/O error: {0}")]
    Io(String),
}

impl LedgerError {
    /// Get an error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::InvalidConfig(_) => "INVALID_CONFIG",
            LedgerError::ConfigNotFound(_) => "CONFIG_NOT_FOUND",
            LedgerError::NegativeBalance { .. } => "NEGATIVE_BALANCE",
            LedgerError::BalanceOverflow { .. } => "BALANCE_OVERFLOW",
            LedgerError::Serialization(_) => "SERIALIZATION_ERROR",
            LedgerError::Io(_) => "IO_ERROR",
        }
    }
}

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

//! Ledger Core - accounts and locked transfers for the transfer benchmark
//!
//! A fixed population of accounts is hit by many short random transfers from
//! concurrent tasks. The sum of all balances must come out unchanged.
//!
//! # Modules
//!
//! - [`account`] - A balance behind a reader/writer lock
//! - [`exchange`] - Ordered two-lock transfers, random operations and totals
//! - [`outcome`] - Operation results and aggregate counters
//! - [`config`] - Workload configuration and its defaults
//! - [`error`] - Transfer refusals and construction errors
//!
//! # Example
//!
//! ```rust
//! use ledger_core::Exchange;
//!
//! let exchange = Exchange::from_balances([10, 10]).unwrap();
//! assert!(exchange.try_transfer(0, 1, 3));
//! assert_eq!(exchange.snapshot(), vec![7, 13]);
//! assert_eq!(exchange.total_balance(), 20);
//! ```

pub mod account;
pub mod exchange;
pub mod outcome;

// Infrastructure modules
pub mod config;
pub mod error;

// Re-exports for convenience
pub use account::Account;
pub use config::{BenchConfig, Engine, Schedule, TransferPolicy};
pub use error::{LedgerError, Result, TransferError};
pub use exchange::{pick_distinct_pair, sample_amount, validate_balances, Exchange};
pub use outcome::{OperationOutcome, OperationStats};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

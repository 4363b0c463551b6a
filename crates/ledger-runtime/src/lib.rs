//! Ledger Runtime - concurrent scheduling of random transfers
//!
//! Runs a configured number of random operations against a ledger on the
//! tokio runtime, waits for every one of them and checks that the total
//! balance came out unchanged.
//!
//! ## Components
//!
//! - **driver**: builds the ledger, schedules operations, verifies the result
//! - **ledger**: the trait the scheduler drives, implemented for the locked exchange
//! - **mailbox**: a single-task ledger fed through a channel
//! - **seeding**: one independent RNG per operation
//! - **report**: run summary and the printed total line
//!
//! ## Example
//!
//! ```ignore
//! use ledger_core::BenchConfig;
//! use ledger_runtime::Driver;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = Driver::new(BenchConfig::default())?.run().await?;
//!     println!("{}", report.summary_line());
//!     Ok(())
//! }
//! ```

pub mod driver;
pub mod error;
pub mod ledger;
pub mod mailbox;
pub mod report;
pub mod seeding;

// Re-exports for convenience
pub use driver::{schedule_operations, with_watchdog, Driver};
pub use error::{Result, RunError};
pub use ledger::Ledger;
pub use mailbox::{MailboxExchange, MailboxHandle};
pub use report::RunReport;
pub use seeding::OperationSeeder;

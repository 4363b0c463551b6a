//! The seam between the scheduler and a ledger implementation

use async_trait::async_trait;
use ledger_core::{Exchange, OperationOutcome};
use rand::rngs::StdRng;

use crate::error::Result;

/// Anything the driver can run random operations against
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Number of accounts
    fn accounts(&self) -> usize;

    /// One random operation with the caller's generator
    async fn run_operation(&self, rng: &mut StdRng) -> Result<OperationOutcome>;

    /// Sum of balances. Callers must have awaited every operation first.
    async fn settled_total(&self) -> Result<i64>;

    /// Every balance, in index order
    async fn settled_balances(&self) -> Result<Vec<i64>>;
}

#[async_trait]
impl Ledger for Exchange {
    fn accounts(&self) -> usize {
        self.len()
    }

    async fn run_operation(&self, rng: &mut StdRng) -> Result<OperationOutcome> {
        Ok(self.random_operation(rng))
    }

    async fn settled_total(&self) -> Result<i64> {
        Ok(self.total_balance())
    }

    async fn settled_balances(&self) -> Result<Vec<i64>> {
        Ok(self.snapshot())
    }
}

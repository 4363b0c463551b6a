//! Summary of a finished run

use ledger_core::{Engine, OperationStats, Schedule};
use std::time::Duration;

/// What a run did and what it ended with
#[derive(Debug, Clone)]
pub struct RunReport {
    pub engine: Engine,
    pub schedule: Schedule,
    pub accounts: usize,
    pub operations: usize,
    /// Sum of the initial balances
    pub expected_total: i64,
    /// Sum after every operation finished
    pub total: i64,
    pub min_balance: i64,
    pub max_balance: i64,
    pub stats: OperationStats,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn is_conserved(&self) -> bool {
        self.total == self.expected_total
    }

    /// The single line the benchmark prints
    pub fn summary_line(&self) -> String {
        format!("Σ = {}", self.total)
    }

    /// Operations per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.stats.operations as f64 / secs
    }
}

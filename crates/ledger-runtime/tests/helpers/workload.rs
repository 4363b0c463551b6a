//! Workload builders and a watchdog for integration tests

use ledger_core::{BenchConfig, Engine, Schedule};
use ledger_runtime::{Driver, RunReport};
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// A seeded workload with the default amount range and attempt budget
pub fn workload(accounts: usize, initial_balance: i64, operations: usize) -> BenchConfig {
    BenchConfig {
        accounts,
        operations,
        initial_balance,
        seed: Some(0x5eed),
        ..Default::default()
    }
}

/// Same workload on another engine and schedule
pub fn with(mut config: BenchConfig, engine: Engine, schedule: Schedule) -> BenchConfig {
    config.engine = engine;
    config.schedule = schedule;
    config
}

/// Run a workload, failing the test if it does not finish within `limit`
pub async fn run_within(config: BenchConfig, limit: Duration) -> (RunReport, Duration) {
    let start = Instant::now();
    let driver = Driver::new(config).expect("valid config");
    let report = timeout(limit, driver.run())
        .await
        .unwrap_or_else(|_| panic!("workload did not finish within {:?}", limit))
        .expect("run failed");
    (report, start.elapsed())
}

//! Builds a ledger, runs the random workload on it and checks the result

use ledger_core::{BenchConfig, Engine, Exchange, OperationStats, Schedule};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{Result, RunError};
use crate::ledger::Ledger;
use crate::mailbox::MailboxExchange;
use crate::report::RunReport;
use crate::seeding::OperationSeeder;

/// Runs one configured workload
#[derive(Debug, Clone)]
pub struct Driver {
    config: BenchConfig,
}

impl Driver {
    /// Validate `config` and wrap it
    pub fn new(config: BenchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Run every operation, wait for all of them, then read and verify the total
    pub async fn run(&self) -> Result<RunReport> {
        let config = &self.config;
        let expected_total = config.expected_total()?;
        let start = Instant::now();

        info!(
            accounts = config.accounts,
            operations = config.operations,
            initial_balance = config.initial_balance,
            engine = ?config.engine,
            schedule = ?config.schedule,
            seed = ?config.seed,
            "Starting run"
        );

        let work = async {
            match config.engine {
                Engine::Locked => self.run_locked().await,
                Engine::Mailbox => self.run_mailbox().await,
            }
        };

        let (total, balances, stats) = with_watchdog(config.watchdog, work).await?;

        let elapsed = start.elapsed();

        if total != expected_total {
            return Err(RunError::ConservationViolated {
                expected: expected_total,
                actual: total,
            });
        }
        if let Some((index, &balance)) = balances.iter().enumerate().find(|(_, b)| **b < 0) {
            return Err(RunError::NegativeBalance { index, balance });
        }

        let report = RunReport {
            engine: config.engine,
            schedule: config.schedule,
            accounts: config.accounts,
            operations: config.operations,
            expected_total,
            total,
            min_balance: balances.iter().copied().min().unwrap_or(0),
            max_balance: balances.iter().copied().max().unwrap_or(0),
            stats,
            elapsed,
        };

        info!(
            total,
            committed = stats.committed,
            refused = stats.refused,
            refused_attempts = stats.refused_attempts,
            volume = stats.volume,
            elapsed_ms = elapsed.as_millis() as u64,
            ops_per_sec = report.throughput() as u64,
            "Run finished"
        );
        if stats.operations > 0 && stats.committed == 0 {
            warn!("No operation committed; every account may be empty");
        }

        Ok(report)
    }

    async fn run_locked(&self) -> Result<(i64, Vec<i64>, OperationStats)> {
        let config = &self.config;
        let exchange = Arc::new(
            Exchange::new(config.accounts, config.initial_balance)?.with_policy(config.policy)?,
        );

        let stats = schedule_operations(
            exchange.clone(),
            config.schedule,
            config.operations,
            OperationSeeder::new(config.seed),
        )
        .await?;

        let total = exchange.settled_total().await?;
        let balances = exchange.settled_balances().await?;
        Ok((total, balances, stats))
    }

    async fn run_mailbox(&self) -> Result<(i64, Vec<i64>, OperationStats)> {
        let config = &self.config;
        let mailbox = MailboxExchange::spawn(
            vec![config.initial_balance; config.accounts],
            config.policy,
        )?;
        let handle = Arc::new(mailbox.handle());

        let stats = schedule_operations(
            handle.clone(),
            config.schedule,
            config.operations,
            OperationSeeder::new(config.seed),
        )
        .await?;

        let total = handle.settled_total().await?;
        drop(handle);
        let balances = mailbox.shutdown().await?;
        Ok((total, balances, stats))
    }
}

/// Run `operations` random operations against `ledger` and wait for all of them.
///
/// Operation `i` always gets the `i`-th seed from `seeder`, whatever the schedule.
pub async fn schedule_operations<L>(
    ledger: Arc<L>,
    schedule: Schedule,
    operations: usize,
    mut seeder: OperationSeeder,
) -> Result<OperationStats>
where
    L: Ledger + 'static,
{
    let mut stats = OperationStats::default();

    match schedule {
        Schedule::Sequential => {
            for _ in 0..operations {
                let mut rng = seeder.next_rng();
                let outcome = ledger.run_operation(&mut rng).await?;
                stats.record(&outcome);
            }
        }

        Schedule::TaskPerOperation => {
            let handles: Vec<JoinHandle<Result<_>>> = (0..operations)
                .map(|_| {
                    let ledger = ledger.clone();
                    let seed = seeder.next_seed();
                    tokio::spawn(async move {
                        let mut rng = StdRng::seed_from_u64(seed);
                        ledger.run_operation(&mut rng).await
                    })
                })
                .collect();

            debug!(tasks = handles.len(), "Spawned operation tasks");

            for handle in handles {
                let outcome = handle.await??;
                stats.record(&outcome);
            }
        }

        Schedule::WorkerPool { workers } => {
            let workers = workers.max(1);
            let per_worker = operations / workers;
            let remainder = operations % workers;

            let handles: Vec<JoinHandle<Result<OperationStats>>> = (0..workers)
                .map(|worker| {
                    let count = per_worker + usize::from(worker < remainder);
                    let seeds = seeder.take_seeds(count);
                    let ledger = ledger.clone();
                    tokio::spawn(async move {
                        let mut worker_stats = OperationStats::default();
                        for seed in seeds {
                            let mut rng = StdRng::seed_from_u64(seed);
                            let outcome = ledger.run_operation(&mut rng).await?;
                            worker_stats.record(&outcome);
                            // Yield between operations so sibling workers get polled
                            tokio::task::yield_now().await;
                        }
                        debug!(worker, operations = worker_stats.operations, "Worker finished");
                        Ok(worker_stats)
                    })
                })
                .collect();

            for handle in handles {
                let worker_stats = handle.await??;
                stats.merge(&worker_stats);
            }
        }
    }

    Ok(stats)
}

/// Await `work`, failing with [`RunError::Watchdog`] if `limit` passes first
pub async fn with_watchdog<T, F>(limit: Option<Duration>, work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => timeout(limit, work).await.map_err(|_| {
            warn!(limit = ?limit, "Watchdog expired");
            RunError::Watchdog {
                duration_ms: limit.as_millis() as u64,
            }
        })?,
        None => work.await,
    }
}

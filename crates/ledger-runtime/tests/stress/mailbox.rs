//! Mailbox engine under load
//!
//! - test_mailbox_full_workload: default population on the mailbox engine
//! - test_mailbox_schedules: every schedule conserves the total
//! - test_mailbox_concurrent_handles: many handles submitting at once

use ledger_core::{Engine, OperationStats, Schedule, TransferPolicy};
use ledger_runtime::MailboxExchange;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use crate::helpers::{init_tracing, run_within, with, workload};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mailbox_full_workload() {
    init_tracing("ledger_runtime=info");

    let config = with(
        workload(1_000, 1_000, 100_000),
        Engine::Mailbox,
        Schedule::TaskPerOperation,
    );
    let (report, elapsed) = run_within(config, Duration::from_secs(120)).await;

    println!("mailbox: 100k operations in {:?}", elapsed);
    assert_eq!(report.summary_line(), "Σ = 1000000");
    assert!(report.min_balance >= 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mailbox_schedules() {
    init_tracing("ledger_runtime=warn");

    for schedule in [
        Schedule::TaskPerOperation,
        Schedule::WorkerPool { workers: 8 },
        Schedule::Sequential,
    ] {
        let config = with(workload(4, 100, 5_000), Engine::Mailbox, schedule);
        let (report, _) = run_within(config, Duration::from_secs(30)).await;
        assert_eq!(report.total, 400, "schedule {:?}", schedule);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mailbox_concurrent_handles() {
    let mailbox = MailboxExchange::spawn(vec![50; 10], TransferPolicy::default()).unwrap();

    let tasks: Vec<_> = (0..32u64)
        .map(|i| {
            let handle = mailbox.handle();
            tokio::spawn(async move {
                let mut rng = StdRng::seed_from_u64(i);
                let mut stats = OperationStats::default();
                for _ in 0..200 {
                    stats.record(&handle.random_operation(&mut rng).await.unwrap());
                }
                stats
            })
        })
        .collect();

    let mut total = OperationStats::default();
    for task in tasks {
        total.merge(&task.await.unwrap());
    }

    let balances = mailbox.shutdown().await.unwrap();
    assert_eq!(total.operations, 6_400);
    assert_eq!(balances.iter().sum::<i64>(), 500);
    assert!(balances.iter().all(|b| *b >= 0));
}

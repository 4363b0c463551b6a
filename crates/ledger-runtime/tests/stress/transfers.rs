//! Locked exchange under load
//!
//! - test_full_workload_conserves_total: 1000 accounts, 100k operations
//! - test_small_population_terminates: 4 accounts, 10k concurrent operations, < 5s
//! - test_empty_accounts_refuse_everything: zero balances, every attempt refused
//! - test_two_accounts_heavy_contention: reciprocal transfers on one pair
//! - test_worker_pool_matches_task_per_operation_total
//! - test_sequential_runs_are_reproducible
//! - test_snapshot_during_load: locked totals stay exact while tasks run

use ledger_core::{Engine, Exchange, Schedule};
use ledger_runtime::{schedule_operations, OperationSeeder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::helpers::{init_tracing, run_within, with, workload};

/// N=1000, balances 1000, M=100_000 with task-per-operation scheduling
/// Expected: Σ = 1_000_000 and no negative balance
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_workload_conserves_total() {
    init_tracing("ledger_runtime=info");

    let (report, elapsed) = run_within(workload(1_000, 1_000, 100_000), Duration::from_secs(120)).await;

    println!(
        "100k operations in {:?}: committed {}, refused {}",
        elapsed, report.stats.committed, report.stats.refused
    );

    assert_eq!(report.total, 1_000_000);
    assert_eq!(report.summary_line(), "Σ = 1000000");
    assert_eq!(report.stats.operations, 100_000);
    assert!(report.min_balance >= 0);
}

/// N=4, balances 100, 10_000 concurrent operations
/// Expected: Σ = 400 within 5 seconds
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_small_population_terminates() {
    init_tracing("ledger_runtime=info");

    let (report, elapsed) = run_within(workload(4, 100, 10_000), Duration::from_secs(5)).await;

    assert_eq!(report.total, 400);
    assert!(report.min_balance >= 0);
    assert!(elapsed < Duration::from_secs(5), "took {:?}", elapsed);
}

/// N=2, balances 0, 1000 operations
/// Expected: Σ = 0, nothing commits, every operation uses all 3 attempts
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_empty_accounts_refuse_everything() {
    init_tracing("ledger_runtime=warn");

    let (report, _) = run_within(workload(2, 0, 1_000), Duration::from_secs(10)).await;

    assert_eq!(report.total, 0);
    assert_eq!(report.stats.committed, 0);
    assert_eq!(report.stats.refused, 1_000);
    assert_eq!(report.stats.refused_attempts, 3_000);
}

/// Two accounts means every operation contends on the same pair in both directions
/// Expected: no deadlock, total unchanged
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_two_accounts_heavy_contention() {
    init_tracing("ledger_runtime=warn");

    let (report, _) = run_within(workload(2, 500, 50_000), Duration::from_secs(30)).await;

    assert_eq!(report.total, 1_000);
    assert!(report.stats.committed > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_worker_pool_matches_task_per_operation_total() {
    init_tracing("ledger_runtime=warn");

    for schedule in [
        Schedule::TaskPerOperation,
        Schedule::WorkerPool { workers: 3 },
        Schedule::WorkerPool { workers: 64 },
        Schedule::Sequential,
    ] {
        let config = with(workload(50, 200, 20_000), Engine::Locked, schedule);
        let (report, _) = run_within(config, Duration::from_secs(30)).await;
        assert_eq!(report.total, 10_000, "schedule {:?}", schedule);
        assert_eq!(report.stats.operations, 20_000, "schedule {:?}", schedule);
    }
}

/// Fixed seed and in-order execution give the same final balances every time
#[tokio::test]
async fn test_sequential_runs_are_reproducible() {
    let run = || async {
        let exchange = Arc::new(Exchange::new(100, 100).unwrap());
        let stats = schedule_operations(
            exchange.clone(),
            Schedule::Sequential,
            10_000,
            OperationSeeder::new(Some(2024)),
        )
        .await
        .unwrap();
        (exchange.snapshot(), stats)
    };

    let (first, first_stats) = run().await;
    let (second, second_stats) = run().await;

    assert_eq!(first, second);
    assert_eq!(first_stats, second_stats);
    assert_eq!(first.iter().sum::<i64>(), 10_000);
}

/// Locked snapshots taken while operations run must always sum to the initial total
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_snapshot_during_load() {
    init_tracing("ledger_runtime=warn");

    let exchange = Arc::new(Exchange::new(16, 100).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    let observer = {
        let exchange = exchange.clone();
        let done = done.clone();
        tokio::task::spawn_blocking(move || {
            let mut snapshots = 0u64;
            while !done.load(Ordering::Acquire) {
                let snapshot = exchange.snapshot();
                assert_eq!(snapshot.iter().sum::<i64>(), 1_600);
                assert!(snapshot.iter().all(|b| *b >= 0));
                snapshots += 1;
            }
            snapshots
        })
    };

    let stats = tokio::time::timeout(
        Duration::from_secs(30),
        schedule_operations(
            exchange.clone(),
            Schedule::TaskPerOperation,
            50_000,
            OperationSeeder::new(Some(9)),
        ),
    )
    .await
    .expect("workload deadlocked")
    .unwrap();

    done.store(true, Ordering::Release);
    let snapshots = observer.await.expect("observer saw an inconsistent snapshot");

    println!("{} snapshots taken during {} operations", snapshots, stats.operations);
    assert_eq!(exchange.total_balance(), 1_600);
}

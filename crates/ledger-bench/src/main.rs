//! Ledger Bench - concurrent money-transfer benchmark
//!
//! Runs 100 000 random transfers between 1000 accounts of 1000 each, waits
//! for all of them and prints the total balance as `Σ = <total>`.
//! Logs go to stderr; stdout carries only the total.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use ledger_core::{BenchConfig, Engine, Schedule};
use ledger_runtime::Driver;

#[derive(Parser, Debug)]
#[command(name = "ledger-bench")]
#[command(about = "Concurrent money-transfer benchmark over per-account locks")]
struct Args {
    /// JSON configuration file (flags below override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of accounts
    #[arg(long)]
    accounts: Option<usize>,

    /// Number of random operations
    #[arg(long)]
    operations: Option<usize>,

    /// Starting balance of every account
    #[arg(long)]
    initial_balance: Option<i64>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// How operations are scheduled
    #[arg(long, value_enum)]
    schedule: Option<ScheduleArg>,

    /// Worker count for `--schedule pool` (default: available parallelism)
    #[arg(long)]
    workers: Option<usize>,

    /// Ledger implementation
    #[arg(long, value_enum)]
    engine: Option<EngineArg>,

    /// Abort if the run takes longer than this (e.g. "30s", "2m")
    #[arg(long, value_parser = parse_duration)]
    watchdog: Option<Duration>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ScheduleArg {
    /// One task per operation
    Tasks,
    /// Bounded worker pool
    Pool,
    /// In order on a single task
    Sequential,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EngineArg {
    /// Per-account reader/writer locks
    Locked,
    /// Single task behind a channel
    Mailbox,
}

fn parse_duration(raw: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(raw)
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Defaults, then the config file, then flags
fn build_config(args: &Args) -> anyhow::Result<BenchConfig> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::from_json_file(path)?,
        None => BenchConfig::default(),
    };

    if let Some(accounts) = args.accounts {
        config.accounts = accounts;
    }
    if let Some(operations) = args.operations {
        config.operations = operations;
    }
    if let Some(initial_balance) = args.initial_balance {
        config.initial_balance = initial_balance;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.watchdog.is_some() {
        config.watchdog = args.watchdog;
    }
    if let Some(engine) = args.engine {
        config.engine = match engine {
            EngineArg::Locked => Engine::Locked,
            EngineArg::Mailbox => Engine::Mailbox,
        };
    }

    match args.schedule {
        Some(ScheduleArg::Tasks) => config.schedule = Schedule::TaskPerOperation,
        Some(ScheduleArg::Sequential) => config.schedule = Schedule::Sequential,
        Some(ScheduleArg::Pool) => {
            config.schedule = Schedule::WorkerPool {
                workers: args.workers.unwrap_or_else(default_workers),
            }
        }
        None => {
            if let (Some(workers), Schedule::WorkerPool { .. }) = (args.workers, config.schedule) {
                config.schedule = Schedule::WorkerPool { workers };
            }
        }
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging on stderr; stdout is reserved for the total
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = build_config(&args)?;
    info!(
        accounts = config.accounts,
        operations = config.operations,
        "Starting ledger bench"
    );

    let driver = Driver::new(config)?;
    let report = match driver.run().await {
        Ok(report) => report,
        Err(e) => {
            error!("Run failed: {}", e);
            return Err(e.into());
        }
    };

    println!("{}", report.summary_line());
    Ok(())
}

//! Configuration types for the benchmark
//!
//! Defaults reproduce the fixed workload: 1000 accounts of 1000 each,
//! 100 000 random operations, amounts in `[1, 50]`, at most 3 attempts.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{LedgerError, Result};

/// Number of accounts in the default workload
pub const NUM_ACCOUNTS: usize = 1_000;
/// Number of random operations in the default workload
pub const NUM_OPERATIONS: usize = 100_000;
/// Starting balance of every account
pub const INIT_BALANCE: i64 = 1_000;
/// Smallest transfer amount
pub const MIN_AMOUNT: i64 = 1;
/// Largest transfer amount (inclusive)
pub const MAX_AMOUNT: i64 = 50;
/// Attempts per random operation
pub const MAX_ATTEMPTS: u32 = 3;

/// Amount range and retry budget of a random operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPolicy {
    /// Lower bound of the amount, inclusive
    pub min_amount: i64,
    /// Upper bound of the amount, inclusive
    pub max_amount: i64,
    /// Attempts on the same account pair before giving up
    pub max_attempts: u32,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            min_amount: MIN_AMOUNT,
            max_amount: MAX_AMOUNT,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl TransferPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.min_amount < 1 {
            return Err(LedgerError::InvalidConfig(format!(
                "min_amount must be at least 1, got {}",
                self.min_amount
            )));
        }
        if self.max_amount < self.min_amount {
            return Err(LedgerError::InvalidConfig(format!(
                "max_amount {} is below min_amount {}",
                self.max_amount, self.min_amount
            )));
        }
        if self.max_attempts == 0 {
            return Err(LedgerError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// How the driver runs operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// One runtime task per operation
    #[default]
    TaskPerOperation,
    /// Operations split across a fixed number of tasks
    WorkerPool { workers: usize },
    /// Inline on the caller, in order
    Sequential,
}

/// Which ledger implementation services the workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    /// Per-account locks, ordered acquisition
    #[default]
    Locked,
    /// Single task owning all balances behind a channel
    Mailbox,
}

/// Full benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Number of accounts
    pub accounts: usize,
    /// Number of random operations to run
    pub operations: usize,
    /// Starting balance of every account
    pub initial_balance: i64,
    /// Amount range and attempt budget
    pub policy: TransferPolicy,
    /// Scheduling strategy
    pub schedule: Schedule,
    /// Ledger implementation
    pub engine: Engine,
    /// Seed for per-operation RNGs (None = OS entropy)
    pub seed: Option<u64>,
    /// Abort the run if it takes longer than this
    #[serde(with = "humantime_serde_opt")]
    pub watchdog: Option<Duration>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            accounts: NUM_ACCOUNTS,
            operations: NUM_OPERATIONS,
            initial_balance: INIT_BALANCE,
            policy: TransferPolicy::default(),
            schedule: Schedule::default(),
            engine: Engine::default(),
            seed: None,
            watchdog: None,
        }
    }
}

impl BenchConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LedgerError::ConfigNotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)?;
        let config: BenchConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Sum of all balances the run must conserve
    pub fn expected_total(&self) -> Result<i64> {
        i64::try_from(self.accounts)
            .ok()
            .and_then(|n| n.checked_mul(self.initial_balance))
            .ok_or(LedgerError::BalanceOverflow {
                accounts: self.accounts,
                initial_balance: self.initial_balance,
            })
    }

    pub fn validate(&self) -> Result<()> {
        if self.accounts < 2 {
            return Err(LedgerError::InvalidConfig(format!(
                "at least 2 accounts are needed for a transfer, got {}",
                self.accounts
            )));
        }
        if self.initial_balance < 0 {
            return Err(LedgerError::NegativeBalance {
                index: 0,
                balance: self.initial_balance,
            });
        }
        if let Schedule::WorkerPool { workers: 0 } = self.schedule {
            return Err(LedgerError::InvalidConfig(
                "worker pool needs at least 1 worker".to_string(),
            ));
        }
        if self.watchdog == Some(Duration::ZERO) {
            return Err(LedgerError::InvalidConfig(
                "watchdog must be longer than zero".to_string(),
            ));
        }
        self.policy.validate()?;
        self.expected_total()?;
        Ok(())
    }
}

// Helper module for Option<Duration> serialization
mod humantime_serde_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration
            .map(|d| humantime::format_duration(d).to_string())
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => humantime::parse_duration(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.accounts, 1_000);
        assert_eq!(config.operations, 100_000);
        assert_eq!(config.initial_balance, 1_000);
        assert_eq!(config.policy.min_amount, 1);
        assert_eq!(config.policy.max_amount, 50);
        assert_eq!(config.policy.max_attempts, 3);
        assert_eq!(config.schedule, Schedule::TaskPerOperation);
        assert_eq!(config.engine, Engine::Locked);
        assert_eq!(config.expected_total().unwrap(), 1_000_000);
        config.validate().unwrap();
    }

    #[test]
    fn test_config_serialization() {
        let mut config = BenchConfig::default();
        config.watchdog = Some(Duration::from_secs(90));
        config.schedule = Schedule::WorkerPool { workers: 4 };

        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("1m 30s"));

        let recovered: BenchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered.watchdog, Some(Duration::from_secs(90)));
        assert_eq!(recovered.schedule, Schedule::WorkerPool { workers: 4 });
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BenchConfig =
            serde_json::from_str(r#"{ "accounts": 4, "engine": "mailbox" }"#).unwrap();
        assert_eq!(config.accounts, 4);
        assert_eq!(config.engine, Engine::Mailbox);
        assert_eq!(config.operations, NUM_OPERATIONS);
        assert_eq!(config.watchdog, None);
    }

    #[test]
    fn test_validation_rejects_bad_settings() {
        let mut config = BenchConfig::default();
        config.accounts = 1;
        assert!(matches!(config.validate(), Err(LedgerError::InvalidConfig(_))));

        let mut config = BenchConfig::default();
        config.policy.min_amount = 0;
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default();
        config.policy.max_amount = 0;
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default();
        config.schedule = Schedule::WorkerPool { workers: 0 };
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default();
        config.initial_balance = i64::MAX;
        assert!(matches!(
            config.validate(),
            Err(LedgerError::BalanceOverflow { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = BenchConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_NOT_FOUND");
    }
}

//! Locked transfers over a fixed set of accounts
//!
//! Every transfer write-locks both endpoints, always taking the lower index
//! first. Snapshots read-lock in the same ascending order, so no combination
//! of transfers and snapshots can wait on each other in a cycle.

use rand::Rng;
use tracing::{debug, trace};

use crate::account::Account;
use crate::config::TransferPolicy;
use crate::error::{LedgerError, Result, TransferError};
use crate::outcome::OperationOutcome;

/// A fixed population of accounts and the transfer protocol between them
#[derive(Debug)]
pub struct Exchange {
    accounts: Box<[Account]>,
    policy: TransferPolicy,
}

impl Exchange {
    /// `accounts` accounts, each starting with `initial_balance`
    pub fn new(accounts: usize, initial_balance: i64) -> Result<Self> {
        if initial_balance < 0 {
            return Err(LedgerError::NegativeBalance {
                index: 0,
                balance: initial_balance,
            });
        }
        i64::try_from(accounts)
            .ok()
            .and_then(|n| n.checked_mul(initial_balance))
            .ok_or(LedgerError::BalanceOverflow {
                accounts,
                initial_balance,
            })?;

        let accounts: Box<[Account]> = (0..accounts).map(|_| Account::new(initial_balance)).collect();

        debug!(
            accounts = accounts.len(),
            initial_balance, "Initialized exchange"
        );

        Ok(Self {
            accounts,
            policy: TransferPolicy::default(),
        })
    }

    /// One account per entry of `balances`, in order
    pub fn from_balances(balances: impl IntoIterator<Item = i64>) -> Result<Self> {
        let balances: Vec<i64> = balances.into_iter().collect();
        let total = validate_balances(&balances)?;

        debug!(accounts = balances.len(), total, "Initialized exchange");

        Ok(Self {
            accounts: balances.into_iter().map(Account::new).collect(),
            policy: TransferPolicy::default(),
        })
    }

    /// Replace the amount range and attempt budget used by [`Exchange::random_operation`]
    pub fn with_policy(mut self, policy: TransferPolicy) -> Result<Self> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    pub fn policy(&self) -> &TransferPolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Balance of one account, or None if out of range
    pub fn balance(&self, index: usize) -> Option<i64> {
        self.accounts.get(index).map(Account::read_balance)
    }

    /// Sum of all balances, read one account at a time.
    ///
    /// Only meaningful while no transfer is running. Use
    /// [`Exchange::locked_total_balance`] for a total that is exact under load.
    pub fn total_balance(&self) -> i64 {
        self.accounts
            .iter()
            .fold(0i64, |sum, account| sum + account.read_balance())
    }

    /// Every balance, read while holding all read locks at once
    pub fn snapshot(&self) -> Vec<i64> {
        let guards: Vec<_> = self.accounts.iter().map(Account::read_guard).collect();
        guards.iter().map(|guard| **guard).collect()
    }

    /// Sum of a consistent [`Exchange::snapshot`]
    pub fn locked_total_balance(&self) -> i64 {
        self.snapshot().into_iter().sum()
    }

    /// Move `amount` from `src` to `dst`, or leave both untouched and say why not
    pub fn transfer(&self, src: usize, dst: usize, amount: i64) -> std::result::Result<(), TransferError> {
        let len = self.accounts.len();
        for index in [src, dst] {
            if index >= len {
                return Err(TransferError::UnknownAccount { index, len });
            }
        }
        if src == dst {
            return Err(TransferError::SameAccount { index: src });
        }
        if amount < 1 {
            return Err(TransferError::NonPositiveAmount(amount));
        }

        let (first, second) = if src < dst { (src, dst) } else { (dst, src) };

        let result = self.accounts[first].write_exclusive(|first_balance| {
            self.accounts[second].write_exclusive(|second_balance| {
                let (src_balance, dst_balance) = if src == first {
                    (first_balance, second_balance)
                } else {
                    (second_balance, first_balance)
                };

                if *src_balance < amount {
                    return Err(TransferError::InsufficientFunds {
                        available: *src_balance,
                        required: amount,
                    });
                }

                *src_balance -= amount;
                *dst_balance += amount;
                Ok(())
            })
        });

        trace!(src, dst, amount, committed = result.is_ok(), "Transfer attempt");
        result
    }

    /// [`Exchange::transfer`] reduced to whether it committed
    pub fn try_transfer(&self, src: usize, dst: usize, amount: i64) -> bool {
        self.transfer(src, dst, amount).is_ok()
    }

    /// Pick a random distinct pair and try up to `max_attempts` random amounts on it
    pub fn random_operation<R: Rng + ?Sized>(&self, rng: &mut R) -> OperationOutcome {
        let Some((src, dst)) = pick_distinct_pair(rng, self.accounts.len()) else {
            return OperationOutcome::Refused {
                src: 0,
                dst: 0,
                attempts: 0,
            };
        };

        for attempt in 1..=self.policy.max_attempts {
            let amount = sample_amount(&self.policy, rng);
            if self.try_transfer(src, dst, amount) {
                return OperationOutcome::Committed {
                    src,
                    dst,
                    amount,
                    attempts: attempt,
                };
            }
        }

        OperationOutcome::Refused {
            src,
            dst,
            attempts: self.policy.max_attempts,
        }
    }
}

/// Check that no balance is negative and that the sum fits in an i64.
///
/// Returns the sum.
pub fn validate_balances(balances: &[i64]) -> Result<i64> {
    let mut total: i64 = 0;
    for (index, &balance) in balances.iter().enumerate() {
        if balance < 0 {
            return Err(LedgerError::NegativeBalance { index, balance });
        }
        total = total
            .checked_add(balance)
            .ok_or(LedgerError::BalanceOverflow {
                accounts: balances.len(),
                initial_balance: balance,
            })?;
    }
    Ok(total)
}

/// Two distinct indices in `[0, len)`, both redrawn until they differ.
///
/// None when fewer than two accounts exist.
pub fn pick_distinct_pair<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<(usize, usize)> {
    if len < 2 {
        return None;
    }
    loop {
        let src = rng.gen_range(0..len);
        let dst = rng.gen_range(0..len);
        if src != dst {
            return Some((src, dst));
        }
    }
}

/// Uniform amount in `[min_amount, max_amount]`
pub fn sample_amount<R: Rng + ?Sized>(policy: &TransferPolicy, rng: &mut R) -> i64 {
    rng.gen_range(policy.min_amount..=policy.max_amount)
}

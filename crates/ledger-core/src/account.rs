//! A single balance behind a reader/writer lock

use parking_lot::{RwLock, RwLockReadGuard};

/// An integer balance guarded by a reader/writer lock.
///
/// Accounts know nothing about transfers. The exchange decides which locks to
/// take and in what order.
#[derive(Debug, Default)]
pub struct Account {
    balance: RwLock<i64>,
}

impl Account {
    /// Create an account holding `balance`
    pub fn new(balance: i64) -> Self {
        Self {
            balance: RwLock::new(balance),
        }
    }

    /// Current balance under shared access
    pub fn read_balance(&self) -> i64 {
        *self.balance.read()
    }

    /// Run `body` with exclusive access to the balance.
    ///
    /// The write guard is dropped when `body` returns or unwinds.
    pub fn write_exclusive<R>(&self, body: impl FnOnce(&mut i64) -> R) -> R {
        let mut guard = self.balance.write();
        body(&mut guard)
    }

    /// Shared guard held by the caller, used for multi-account snapshots
    pub(crate) fn read_guard(&self) -> RwLockReadGuard<'_, i64> {
        self.balance.read()
    }
}

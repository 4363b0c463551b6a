//! Single-owner ledger behind a channel
//!
//! One task owns every balance and applies requests in arrival order, so no
//! per-account locking is needed. Callers hold a cloneable [`MailboxHandle`]
//! and await a oneshot reply per request.

use async_trait::async_trait;
use ledger_core::{
    pick_distinct_pair, sample_amount, validate_balances, OperationOutcome, TransferError,
    TransferPolicy,
};
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::error::{Result, RunError};
use crate::ledger::Ledger;

/// Requests served by the mailbox task
#[derive(Debug)]
enum Request {
    Transfer {
        src: usize,
        dst: usize,
        amount: i64,
        reply: oneshot::Sender<std::result::Result<(), TransferError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<i64>>,
    },
}

/// Owns the mailbox task. Dropping every handle lets [`MailboxExchange::shutdown`] finish.
pub struct MailboxExchange {
    handle: MailboxHandle,
    actor: JoinHandle<Vec<i64>>,
}

impl MailboxExchange {
    /// Start the mailbox task with the given balances. Must run inside a tokio runtime.
    pub fn spawn(balances: Vec<i64>, policy: TransferPolicy) -> Result<Self> {
        let total = validate_balances(&balances)?;
        policy.validate()?;

        let (inbox, requests) = mpsc::unbounded_channel();
        let accounts = balances.len();
        let actor = tokio::spawn(serve(balances, requests));

        info!(accounts, total, "Started mailbox exchange");

        Ok(Self {
            handle: MailboxHandle {
                inbox,
                accounts,
                policy,
            },
            actor,
        })
    }

    /// A new handle for submitting requests
    pub fn handle(&self) -> MailboxHandle {
        self.handle.clone()
    }

    /// Close the inbox and return the final balances.
    ///
    /// Waits until every outstanding [`MailboxHandle`] has been dropped.
    pub async fn shutdown(self) -> Result<Vec<i64>> {
        drop(self.handle);
        let balances = self.actor.await?;
        Ok(balances)
    }
}

/// Cloneable client of a [`MailboxExchange`]
#[derive(Debug, Clone)]
pub struct MailboxHandle {
    inbox: mpsc::UnboundedSender<Request>,
    accounts: usize,
    policy: TransferPolicy,
}

impl MailboxHandle {
    /// Move `amount` from `src` to `dst`. Refusals come back as [`RunError::Refused`].
    pub async fn transfer(&self, src: usize, dst: usize, amount: i64) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.inbox
            .send(Request::Transfer {
                src,
                dst,
                amount,
                reply,
            })
            .map_err(|_| RunError::MailboxClosed)?;
        let outcome = response.await.map_err(|_| RunError::MailboxClosed)?;
        outcome.map_err(RunError::from)
    }

    /// Whether the transfer committed
    pub async fn try_transfer(&self, src: usize, dst: usize, amount: i64) -> Result<bool> {
        match self.transfer(src, dst, amount).await {
            Ok(()) => Ok(true),
            Err(RunError::Refused(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Same pair selection and retry budget as [`ledger_core::Exchange::random_operation`]
    pub async fn random_operation(&self, rng: &mut StdRng) -> Result<OperationOutcome> {
        let Some((src, dst)) = pick_distinct_pair(rng, self.accounts) else {
            return Ok(OperationOutcome::Refused {
                src: 0,
                dst: 0,
                attempts: 0,
            });
        };

        for attempt in 1..=self.policy.max_attempts {
            let amount = sample_amount(&self.policy, rng);
            if self.try_transfer(src, dst, amount).await? {
                return Ok(OperationOutcome::Committed {
                    src,
                    dst,
                    amount,
                    attempts: attempt,
                });
            }
        }

        Ok(OperationOutcome::Refused {
            src,
            dst,
            attempts: self.policy.max_attempts,
        })
    }

    /// Current balances as seen by the mailbox task
    pub async fn snapshot(&self) -> Result<Vec<i64>> {
        let (reply, response) = oneshot::channel();
        self.inbox
            .send(Request::Snapshot { reply })
            .map_err(|_| RunError::MailboxClosed)?;
        response.await.map_err(|_| RunError::MailboxClosed)
    }

    pub async fn total_balance(&self) -> Result<i64> {
        Ok(self.snapshot().await?.into_iter().sum())
    }
}

#[async_trait]
impl Ledger for MailboxHandle {
    fn accounts(&self) -> usize {
        self.accounts
    }

    async fn run_operation(&self, rng: &mut StdRng) -> Result<OperationOutcome> {
        self.random_operation(rng).await
    }

    async fn settled_total(&self) -> Result<i64> {
        self.total_balance().await
    }

    async fn settled_balances(&self) -> Result<Vec<i64>> {
        self.snapshot().await
    }
}

async fn serve(mut balances: Vec<i64>, mut requests: mpsc::UnboundedReceiver<Request>) -> Vec<i64> {
    let mut served: u64 = 0;
    while let Some(request) = requests.recv().await {
        served += 1;
        match request {
            Request::Transfer {
                src,
                dst,
                amount,
                reply,
            } => {
                let result = apply_transfer(&mut balances, src, dst, amount);
                trace!(src, dst, amount, committed = result.is_ok(), "Mailbox transfer");
                // The caller may have gone away; the transfer stands either way
                let _ = reply.send(result);
            }
            Request::Snapshot { reply } => {
                let _ = reply.send(balances.clone());
            }
        }
    }
    debug!(served, "Mailbox inbox closed");
    balances
}

fn apply_transfer(
    balances: &mut [i64],
    src: usize,
    dst: usize,
    amount: i64,
) -> std::result::Result<(), TransferError> {
    let len = balances.len();
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
    if balances[src] < amount {
        return Err(TransferError::InsufficientFunds {
            available: balances[src],
            required: amount,
        });
    }
    balances[src] -= amount;
    balances[dst] += amount;
    Ok(())
}

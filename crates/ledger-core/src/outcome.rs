//! Results of random operations and their aggregate counters

use serde::{Deserialize, Serialize};

/// What a single random operation ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationOutcome {
    /// A transfer committed on attempt number `attempts`
    Committed {
        src: usize,
        dst: usize,
        amount: i64,
        attempts: u32,
    },
    /// Every attempt was refused. `attempts` is zero when no distinct pair exists.
    Refused { src: usize, dst: usize, attempts: u32 },
}

impl OperationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, OperationOutcome::Committed { .. })
    }

    /// Number of `try_transfer` calls made
    pub fn attempts(&self) -> u32 {
        match self {
            OperationOutcome::Committed { attempts, .. }
            | OperationOutcome::Refused { attempts, .. } => *attempts,
        }
    }

    /// Refused `try_transfer` calls made by this operation
    pub fn refused_attempts(&self) -> u32 {
        match self {
            OperationOutcome::Committed { attempts, .. } => attempts.saturating_sub(1),
            OperationOutcome::Refused { attempts, .. } => *attempts,
        }
    }
}

/// Counters over many operations. Workers keep their own and merge at the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStats {
    pub operations: u64,
    pub committed: u64,
    pub refused: u64,
    pub refused_attempts: u64,
    /// Sum of committed amounts
    pub volume: i64,
}

impl OperationStats {
    pub fn record(&mut self, outcome: &OperationOutcome) {
        self.operations += 1;
        self.refused_attempts += u64::from(outcome.refused_attempts());
        match outcome {
            OperationOutcome::Committed { amount, .. } => {
                self.committed += 1;
                self.volume = self.volume.saturating_add(*amount);
            }
            OperationOutcome::Refused { .. } => self.refused += 1,
        }
    }

    pub fn merge(&mut self, other: &OperationStats) {
        self.operations += other.operations;
        self.committed += other.committed;
        self.refused += other.refused;
        self.refused_attempts += other.refused_attempts;
        self.volume = self.volume.saturating_add(other.volume);
    }

    /// Fraction of operations that committed (0.0 when empty)
    pub fn commit_ratio(&self) -> f64 {
        if self.operations == 0 {
            return 0.0;
        }
        self.committed as f64 / self.operations as f64
    }
}

impl<'a> FromIterator<&'a OperationOutcome> for OperationStats {
    fn from_iter<I: IntoIterator<Item = &'a OperationOutcome>>(iter: I) -> Self {
        let mut stats = OperationStats::default();
        for outcome in iter {
            stats.record(outcome);
        }
        stats
    }
}

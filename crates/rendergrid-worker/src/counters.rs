//! Cumulative success / failure counters.

use std::ops::{Add, AddAssign};

/// Render outcomes. Cumulative on a worker; a delta when returned from
/// [`Worker::latest_stats`](crate::Worker::latest_stats).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerCounters {
    /// Renders rejected because no slot was free.
    pub failed: u64,
    /// Renders that ran to completion.
    pub success: u64,
}

impl WorkerCounters {
    pub fn new(failed: u64, success: u64) -> Self {
        Self { failed, success }
    }

    pub fn total(&self) -> u64 {
        self.failed + self.success
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }

    /// Increment from `earlier` to `self`.
    ///
    /// Counters only grow, so this saturates rather than wrapping if the
    /// two reads were torn.
    pub fn since(&self, earlier: WorkerCounters) -> WorkerCounters {
        WorkerCounters {
            failed: self.failed.saturating_sub(earlier.failed),
            success: self.success.saturating_sub(earlier.success),
        }
    }

    /// `failed / (failed + success)`, or `None` with nothing recorded.
    pub fn error_rate(&self) -> Option<f64> {
        if self.is_zero() {
            None
        } else {
            Some(self.failed as f64 / self.total() as f64)
        }
    }
}

impl Add for WorkerCounters {
    type Output = WorkerCounters;

    fn add(self, rhs: WorkerCounters) -> WorkerCounters {
        WorkerCounters {
            failed: self.failed + rhs.failed,
            success: self.success + rhs.success,
        }
    }
}

impl AddAssign for WorkerCounters {
    fn add_assign(&mut self, rhs: WorkerCounters) {
        *self = *self + rhs;
    }
}

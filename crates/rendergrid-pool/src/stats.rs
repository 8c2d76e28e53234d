//! Pool statistics: running totals built from per-worker deltas.
//!
//! Workers only report the increment since they were last sampled. The
//! accumulator folds every increment into pool-level totals, which is
//! what keeps the totals intact when a worker is removed.

use rendergrid_worker::WorkerCounters;

/// Snapshot returned by [`WorkerPool::stats`](crate::WorkerPool::stats).
///
/// Ratios are `None` when their denominator is zero ("no data yet"),
/// never `NaN` and never zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolStats {
    /// Running totals across every worker the pool has ever sampled.
    pub totals: WorkerCounters,
    /// Increments gathered by this snapshot alone.
    pub window: WorkerCounters,
    /// Occupied slots across live workers, right now.
    pub busy: usize,
    /// Slot capacity across live workers, right now.
    pub slots: usize,
    /// Live workers.
    pub workers: usize,
    /// `failed / (failed + success)` over the running totals.
    pub error_rate: Option<f64>,
    /// Same ratio over `window`.
    pub window_error_rate: Option<f64>,
    /// `busy / slots`.
    pub utilization: Option<f64>,
    /// Mean of every defined `utilization` so far.
    pub avg_utilization: Option<f64>,
    /// Number of snapshots taken, this one included.
    pub sample_count: u64,
}

impl PoolStats {
    /// Renders that finished or were rejected.
    pub fn jobs(&self) -> u64 {
        self.totals.total()
    }
}

/// Pool-level state carried from one snapshot to the next.
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    totals: WorkerCounters,
    /// Increments from removed workers, not yet part of a window.
    retired: WorkerCounters,
    avg_utilization: Option<f64>,
    utilization_samples: u64,
    sample_count: u64,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totals(&self) -> WorkerCounters {
        self.totals
    }

    /// Keep the unread increment of a worker that is being removed; it
    /// is folded in by the next [`record`](Self::record).
    pub fn retire(&mut self, delta: WorkerCounters) {
        self.retired += delta;
    }

    /// Fold one sampling pass into the running state.
    ///
    /// `window` is the sum of live worker deltas; `busy`, `slots` and
    /// `workers` are instantaneous.
    pub fn record(
        &mut self,
        window: WorkerCounters,
        busy: usize,
        slots: usize,
        workers: usize,
    ) -> PoolStats {
        let window = window + std::mem::take(&mut self.retired);
        self.totals += window;
        self.sample_count += 1;

        let utilization = (slots > 0).then(|| busy as f64 / slots as f64);
        if let Some(u) = utilization {
            self.utilization_samples += 1;
            let n = self.utilization_samples as f64;
            self.avg_utilization = Some(match self.avg_utilization {
                None => u,
                Some(avg) => (avg * (n - 1.0) + u) / n,
            });
        }

        PoolStats {
            totals: self.totals,
            window,
            busy,
            slots,
            workers,
            error_rate: self.totals.error_rate(),
            window_error_rate: window.error_rate(),
            utilization,
            avg_utilization: self.avg_utilization,
            sample_count: self.sample_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_with_no_work_has_no_error_rate() {
        let mut acc = StatsAccumulator::new();
        let stats = acc.record(WorkerCounters::default(), 0, 10, 2);

        assert_eq!(stats.error_rate, None);
        assert_eq!(stats.window_error_rate, None);
        assert_eq!(stats.utilization, Some(0.0));
        assert_eq!(stats.avg_utilization, Some(0.0));
        assert_eq!(stats.sample_count, 1);
    }

    #[test]
    fn windows_fold_into_totals() {
        let mut acc = StatsAccumulator::new();
        acc.record(WorkerCounters::new(1, 9), 0, 10, 1);
        let stats = acc.record(WorkerCounters::new(1, 1), 0, 10, 1);

        assert_eq!(stats.totals, WorkerCounters::new(2, 10));
        assert_eq!(stats.window, WorkerCounters::new(1, 1));
        assert_eq!(stats.jobs(), 12);
        assert_eq!(stats.window_error_rate, Some(0.5));
        let rate = stats.error_rate.unwrap();
        assert!((rate - 2.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn totals_outlive_an_empty_window() {
        let mut acc = StatsAccumulator::new();
        acc.record(WorkerCounters::new(1, 3), 0, 10, 1);
        let stats = acc.record(WorkerCounters::default(), 0, 10, 1);

        assert_eq!(stats.error_rate, Some(0.25));
        assert_eq!(stats.window_error_rate, None);
    }

    #[test]
    fn average_utilization_is_incremental_mean() {
        let mut acc = StatsAccumulator::new();
        acc.record(WorkerCounters::default(), 2, 10, 1);
        acc.record(WorkerCounters::default(), 4, 10, 1);
        let stats = acc.record(WorkerCounters::default(), 9, 10, 1);

        assert_eq!(stats.utilization, Some(0.9));
        let avg = stats.avg_utilization.unwrap();
        assert!((avg - 0.5).abs() < 1e-12, "avg = {avg}");
        assert_eq!(stats.sample_count, 3);
    }

    #[test]
    fn zero_capacity_skips_utilization_sample() {
        let mut acc = StatsAccumulator::new();
        acc.record(WorkerCounters::default(), 5, 10, 1);
        let stats = acc.record(WorkerCounters::default(), 0, 0, 0);

        assert_eq!(stats.utilization, None);
        assert_eq!(stats.avg_utilization, Some(0.5));
        assert_eq!(stats.sample_count, 2);
    }

    #[test]
    fn retired_counts_join_the_next_window() {
        let mut acc = StatsAccumulator::new();
        acc.record(WorkerCounters::new(0, 2), 0, 10, 2);
        acc.retire(WorkerCounters::new(1, 1));
        assert_eq!(acc.totals(), WorkerCounters::new(0, 2));

        let stats = acc.record(WorkerCounters::new(0, 1), 0, 5, 1);
        assert_eq!(stats.window, WorkerCounters::new(1, 2));
        assert_eq!(stats.totals, WorkerCounters::new(1, 4));

        let stats = acc.record(WorkerCounters::default(), 0, 5, 1);
        assert_eq!(stats.window, WorkerCounters::default());
    }
}

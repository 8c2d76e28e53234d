//! Autoscaler: one-worker-at-a-time scaling on the pool error rate.
//!
//! The decision rule is a pure function of a `PoolStats` snapshot. The
//! cooldown lives on the pool and is checked before any stats are taken.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use rendergrid_core::SimConfig;
use rendergrid_pool::{PoolResult, PoolStats, WorkerPool};

/// Dead-band divisor: no scale-down while the error rate is at least
/// `target / DEAD_BAND_DIVISOR`.
const DEAD_BAND_DIVISOR: f64 = 1.1;

/// Scale-down cooldown, in multiples of the scale-up cooldown.
const SCALE_DOWN_COOLDOWN_FACTOR: u32 = 2;

/// A scaling decision for the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDecision {
    /// Append one worker.
    AddWorker,
    /// Remove the tail worker.
    RemoveWorker,
    /// No change needed.
    NoChange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutoscaleConfig {
    /// Error rate to steer towards.
    pub target_error_rate: f64,
    /// Slots for every worker the autoscaler adds.
    pub slots_per_worker: usize,
    /// Scale-up cooldown; scale-down waits twice this long.
    pub delay: Duration,
    /// Never scale down below this many workers. Values below 1 act as 1.
    pub min_workers: usize,
}

impl Default for AutoscaleConfig {
    fn default() -> Self {
        Self {
            target_error_rate: 0.001,
            slots_per_worker: 15,
            delay: Duration::from_secs(5),
            min_workers: 1,
        }
    }
}

impl From<&SimConfig> for AutoscaleConfig {
    fn from(config: &SimConfig) -> Self {
        Self {
            target_error_rate: config.target_error_rate,
            slots_per_worker: config.worker_slots,
            delay: config.autoscale_delay(),
            min_workers: config.min_workers,
        }
    }
}

/// Evaluates pool stats and resizes the pool one worker at a time.
#[derive(Debug, Clone)]
pub struct Autoscaler {
    config: AutoscaleConfig,
}

impl Autoscaler {
    pub fn new(config: AutoscaleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AutoscaleConfig {
        &self.config
    }

    /// Decide what to do given a stats snapshot, ignoring cooldowns.
    ///
    /// A missing error rate (nothing finished or failed yet) is never
    /// read as zero, so it does not trigger a scale-down.
    pub fn decide(&self, stats: &PoolStats) -> ScaleDecision {
        let Some(rate) = stats.error_rate else {
            return ScaleDecision::NoChange;
        };
        let target = self.config.target_error_rate;

        if rate > target {
            ScaleDecision::AddWorker
        } else if rate < target / DEAD_BAND_DIVISOR {
            if stats.workers > self.floor() {
                ScaleDecision::RemoveWorker
            } else {
                debug!(
                    workers = stats.workers,
                    min = self.floor(),
                    "at minimum pool size, not scaling down"
                );
                ScaleDecision::NoChange
            }
        } else {
            ScaleDecision::NoChange
        }
    }

    /// The pool never shrinks below one worker.
    fn floor(&self) -> usize {
        self.config.min_workers.max(1)
    }

    /// Run one autoscale step against the pool.
    ///
    /// Inside the cooldown window this does nothing and takes no stats.
    /// Otherwise it samples the pool, applies [`decide`](Self::decide),
    /// and arms the matching cooldown when it acts.
    pub async fn evaluate(&self, pool: &WorkerPool) -> PoolResult<ScaleDecision> {
        let now = Instant::now();
        if now < pool.autoscale_cooldown().await {
            return Ok(ScaleDecision::NoChange);
        }

        let stats = pool.stats().await;
        let decision = self.decide(&stats);

        match decision {
            ScaleDecision::AddWorker => {
                pool.set_autoscale_cooldown(now + self.config.delay).await;
                pool.add_workers(1, self.config.slots_per_worker).await;
                info!(
                    pool = %pool.name(),
                    error_rate = ?stats.error_rate,
                    target = self.config.target_error_rate,
                    workers = stats.workers + 1,
                    "scaling up"
                );
            }
            ScaleDecision::RemoveWorker => {
                pool.remove_workers(1).await?;
                pool.set_autoscale_cooldown(now + self.config.delay * SCALE_DOWN_COOLDOWN_FACTOR)
                    .await;
                info!(
                    pool = %pool.name(),
                    error_rate = ?stats.error_rate,
                    target = self.config.target_error_rate,
                    workers = stats.workers - 1,
                    "scaling down"
                );
            }
            ScaleDecision::NoChange => {}
        }

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rendergrid_core::{Render, SeededRandom};
    use rendergrid_worker::WorkerCounters;

    fn scaler(target: f64) -> Autoscaler {
        Autoscaler::new(AutoscaleConfig {
            target_error_rate: target,
            slots_per_worker: 1,
            delay: Duration::from_secs(5),
            min_workers: 1,
        })
    }

    fn stats_with_rate(rate: Option<f64>, workers: usize) -> PoolStats {
        PoolStats {
            error_rate: rate,
            workers,
            ..PoolStats::default()
        }
    }

    fn pool(workers: usize, slots: usize) -> WorkerPool {
        WorkerPool::new("autoscale", workers, slots, Arc::new(SeededRandom::new(42)))
    }

    #[test]
    fn scale_up_when_above_target() {
        let s = scaler(0.01);
        assert_eq!(
            s.decide(&stats_with_rate(Some(0.02), 4)),
            ScaleDecision::AddWorker
        );
    }

    #[test]
    fn scale_down_when_below_dead_band() {
        let s = scaler(0.01);
        assert_eq!(
            s.decide(&stats_with_rate(Some(0.008), 4)),
            ScaleDecision::RemoveWorker
        );
        assert_eq!(
            s.decide(&stats_with_rate(Some(0.005), 4)),
            ScaleDecision::RemoveWorker
        );
        assert_eq!(
            s.decide(&stats_with_rate(Some(0.0), 4)),
            ScaleDecision::RemoveWorker
        );
    }

    #[test]
    fn no_change_inside_dead_band() {
        let s = scaler(0.01);
        for rate in [0.0095, 0.01, 0.01 / 1.1] {
            assert_eq!(
                s.decide(&stats_with_rate(Some(rate), 4)),
                ScaleDecision::NoChange,
                "rate {rate}"
            );
        }
    }

    #[test]
    fn missing_error_rate_is_not_zero() {
        let s = scaler(0.01);
        assert_eq!(s.decide(&stats_with_rate(None, 4)), ScaleDecision::NoChange);
    }

    #[test]
    fn respects_min_workers() {
        let s = scaler(0.01);
        assert_eq!(
            s.decide(&stats_with_rate(Some(0.0), 1)),
            ScaleDecision::NoChange
        );
        // Scaling up is never floored.
        assert_eq!(
            s.decide(&stats_with_rate(Some(1.0), 1)),
            ScaleDecision::AddWorker
        );
    }

    #[test]
    fn zero_floor_still_keeps_one_worker() {
        let s = Autoscaler::new(AutoscaleConfig {
            min_workers: 0,
            ..AutoscaleConfig::default()
        });
        assert_eq!(
            s.decide(&stats_with_rate(Some(0.0), 1)),
            ScaleDecision::NoChange
        );
        assert_eq!(
            s.decide(&stats_with_rate(Some(0.0), 2)),
            ScaleDecision::RemoveWorker
        );
    }

    #[tokio::test(start_paused = true)]
    async fn zero_floor_never_empties_the_pool() {
        let pool = pool(1, 10);
        pool.submit_random(Render::new(1, 10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        pool.settled_views().await;

        let s = Autoscaler::new(AutoscaleConfig {
            target_error_rate: 0.01,
            slots_per_worker: 10,
            delay: Duration::from_secs(1),
            min_workers: 0,
        });
        for _ in 0..50 {
            assert_ne!(s.evaluate(&pool).await.unwrap(), ScaleDecision::RemoveWorker);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(pool.worker_count().await, 1);
        assert!(pool.submit_random(Render::new(2, 10)).await.is_ok());
    }

    #[test]
    fn config_from_sim_config() {
        let sim = SimConfig {
            target_error_rate: 0.05,
            worker_slots: 7,
            autoscale_delay_secs: 3,
            min_workers: 2,
            ..SimConfig::default()
        };
        let config = AutoscaleConfig::from(&sim);
        assert_eq!(config.target_error_rate, 0.05);
        assert_eq!(config.slots_per_worker, 7);
        assert_eq!(config.delay, Duration::from_secs(3));
        assert_eq!(config.min_workers, 2);
        assert_eq!(AutoscaleConfig::from(&SimConfig::default()), AutoscaleConfig::default());
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_allows_one_scale_up_per_window() {
        // A zero-slot worker rejects everything: error rate 1.0.
        let pool = pool(1, 0);
        pool.submit_random(Render::new(1, 10)).await.unwrap();
        pool.settled_views().await;

        let s = scaler(0.01);
        assert_eq!(s.evaluate(&pool).await.unwrap(), ScaleDecision::AddWorker);
        assert_eq!(s.evaluate(&pool).await.unwrap(), ScaleDecision::NoChange);
        assert_eq!(pool.worker_count().await, 2);

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(s.evaluate(&pool).await.unwrap(), ScaleDecision::NoChange);
        assert_eq!(pool.worker_count().await, 2);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(s.evaluate(&pool).await.unwrap(), ScaleDecision::AddWorker);
        assert_eq!(pool.worker_count().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn scale_down_cooldown_is_twice_as_long() {
        let pool = pool(3, 10);
        pool.submit_random(Render::new(1, 10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        pool.settled_views().await;

        let s = scaler(0.01);
        assert_eq!(s.evaluate(&pool).await.unwrap(), ScaleDecision::RemoveWorker);
        assert_eq!(pool.worker_count().await, 2);

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(s.evaluate(&pool).await.unwrap(), ScaleDecision::NoChange);
        assert_eq!(pool.worker_count().await, 2);

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(s.evaluate(&pool).await.unwrap(), ScaleDecision::RemoveWorker);
        assert_eq!(pool.worker_count().await, 1);

        // The floor holds and arms no cooldown.
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(s.evaluate(&pool).await.unwrap(), ScaleDecision::NoChange);
        assert_eq!(pool.worker_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn no_data_leaves_pool_alone() {
        let pool = pool(3, 10);
        let s = scaler(0.01);
        let before = pool.autoscale_cooldown().await;

        assert_eq!(s.evaluate(&pool).await.unwrap(), ScaleDecision::NoChange);
        assert_eq!(pool.worker_count().await, 3);
        assert_eq!(pool.autoscale_cooldown().await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_skips_stats_sampling() {
        let pool = pool(1, 0);
        pool.submit_random(Render::new(1, 10)).await.unwrap();
        pool.settled_views().await;

        let s = scaler(0.01);
        s.evaluate(&pool).await.unwrap();
        s.evaluate(&pool).await.unwrap();

        // Only the first evaluation took a sample.
        let stats = pool.stats().await;
        assert_eq!(stats.sample_count, 2);
        assert_eq!(stats.totals, WorkerCounters::new(1, 0));
    }
}

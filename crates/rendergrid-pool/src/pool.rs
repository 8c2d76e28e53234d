//! Worker pool. Owns the workers, routes renders, aggregates stats.
//!
//! The worker list sits behind a single `RwLock`. Routing and display
//! take the read side; sampling stats and adding or removing workers
//! take the write side, so no reader ever sees a half-mutated list.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use rendergrid_core::{RandomSource, Render};
use rendergrid_worker::{Worker, WorkerCounters, WorkerHandle, WorkerSnapshot};

use crate::error::{PoolError, PoolResult};
use crate::selector::RandomSelector;
use crate::stats::{PoolStats, StatsAccumulator};

struct PoolState {
    /// Insertion order; removal always takes from the tail.
    workers: Vec<Worker>,
    stats: StatsAccumulator,
    /// No autoscale action before this instant.
    autoscale_cooldown: Instant,
}

/// A named pool of render workers.
pub struct WorkerPool {
    name: String,
    state: RwLock<PoolState>,
    selector: RandomSelector,
}

impl WorkerPool {
    /// Create a pool of `worker_count` empty workers with `worker_slots`
    /// slots each. Must be called from within a tokio runtime.
    pub fn new(
        name: impl Into<String>,
        worker_count: usize,
        worker_slots: usize,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        let name = name.into();
        let workers = (0..worker_count)
            .map(|_| Worker::spawn(worker_slots))
            .collect();
        info!(
            pool = %name,
            workers = worker_count,
            slots = worker_slots,
            "worker pool created"
        );

        Self {
            name,
            state: RwLock::new(PoolState {
                workers,
                stats: StatsAccumulator::new(),
                autoscale_cooldown: Instant::now(),
            }),
            selector: RandomSelector::new(rng),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sample every live worker and fold the result into the running
    /// totals.
    ///
    /// Each call consumes the workers' deltas, so it is not idempotent.
    /// Workers are read one after another; a snapshot may mix slightly
    /// different moments across workers.
    pub async fn stats(&self) -> PoolStats {
        let mut state = self.state.write().await;
        let state = &mut *state;

        let mut window = WorkerCounters::default();
        let (mut busy, mut slots) = (0usize, 0usize);
        for worker in state.workers.iter_mut() {
            slots += worker.slots();
            busy += worker.busy();
            window += worker.latest_stats();
        }

        let stats = state
            .stats
            .record(window, busy, slots, state.workers.len());
        debug!(
            pool = %self.name,
            failed = stats.totals.failed,
            success = stats.totals.success,
            busy,
            slots,
            "pool stats sampled"
        );
        stats
    }

    /// A uniformly random live worker.
    pub async fn select_random(&self) -> PoolResult<WorkerHandle> {
        let state = self.state.read().await;
        let idx = self
            .selector
            .next(state.workers.len())
            .ok_or_else(|| PoolError::EmptyPool(self.name.clone()))?;
        Ok(state.workers[idx].handle())
    }

    /// Hand a render to a random worker. The worker decides whether it
    /// fits; the outcome shows up in its counters.
    pub async fn submit_random(&self, render: Render) -> PoolResult<()> {
        self.select_random().await?.submit(render);
        Ok(())
    }

    /// Append `count` empty workers with `slots` slots each.
    pub async fn add_workers(&self, count: usize, slots: usize) {
        let mut state = self.state.write().await;
        state
            .workers
            .extend((0..count).map(|_| Worker::spawn(slots)));
        info!(
            pool = %self.name,
            count,
            slots,
            workers = state.workers.len(),
            "adding workers"
        );
    }

    /// Remove `count` workers from the tail.
    ///
    /// Completed work the removed workers had not reported yet is kept
    /// for the next stats sample. Renders still in flight on them are
    /// abandoned and never counted.
    pub async fn remove_workers(&self, count: usize) -> PoolResult<()> {
        let mut state = self.state.write().await;
        let available = state.workers.len();
        if count > available {
            warn!(
                pool = %self.name,
                requested = count,
                available,
                "refusing to remove more workers than exist"
            );
            return Err(PoolError::InsufficientWorkers {
                pool: self.name.clone(),
                requested: count,
                available,
            });
        }

        let removed = state.workers.split_off(available - count);
        for mut worker in removed {
            let delta = worker.latest_stats();
            state.stats.retire(delta);
            debug!(pool = %self.name, abandoned = worker.busy(), "worker removed");
        }
        info!(
            pool = %self.name,
            count,
            workers = state.workers.len(),
            "removing workers"
        );
        Ok(())
    }

    pub async fn worker_count(&self) -> usize {
        self.state.read().await.workers.len()
    }

    /// Display views of every live worker, in pool order.
    pub async fn worker_views(&self) -> Vec<WorkerSnapshot> {
        let state = self.state.read().await;
        state.workers.iter().map(Worker::view).collect()
    }

    /// Settled snapshots of every live worker, in pool order.
    ///
    /// Each one reflects every render submitted to that worker before
    /// the call.
    pub async fn settled_views(&self) -> Vec<WorkerSnapshot> {
        let state = self.state.read().await;
        let mut views = Vec::with_capacity(state.workers.len());
        for worker in &state.workers {
            if let Some(view) = worker.settled().await {
                views.push(view);
            }
        }
        views
    }

    pub async fn autoscale_cooldown(&self) -> Instant {
        self.state.read().await.autoscale_cooldown
    }

    pub async fn set_autoscale_cooldown(&self, until: Instant) {
        self.state.write().await.autoscale_cooldown = until;
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

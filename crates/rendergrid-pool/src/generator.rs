//! Work generator. Feeds renders into a pool at a fixed rate.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use rendergrid_core::RenderGenerator;

use crate::error::PoolResult;
use crate::pool::WorkerPool;

/// Submits one freshly sampled render to a random worker every
/// `1s / rps`.
pub struct WorkGenerator {
    pool: Arc<WorkerPool>,
    renders: RenderGenerator,
    rps: u32,
}

impl WorkGenerator {
    pub fn new(pool: Arc<WorkerPool>, renders: RenderGenerator, rps: u32) -> Self {
        Self { pool, renders, rps }
    }

    pub fn rps(&self) -> u32 {
        self.rps
    }

    /// Time between two submissions.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(1) / self.rps.max(1)
    }

    /// Generate and submit a single render.
    pub async fn tick(&self) -> PoolResult<()> {
        let render = self.renders.generate();
        self.pool.submit_random(render).await
    }

    /// Run until the shutdown signal flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(pool = %self.pool.name(), rps = self.rps, "work generator started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        warn!(error = %e, "render dropped");
                    }
                }
                _ = shutdown.changed() => {
                    info!("work generator shutting down");
                    break;
                }
            }
        }
    }
}

//! Simulation mode. Wires the pool, the work generator, and the
//! autoscaler, then runs the control loop.
//!
//! In this mode the daemon:
//! 1. Builds the random source (seeded or entropy)
//! 2. Spawns the initial workers and the work generator task
//! 3. Every 100ms runs one autoscale step and redraws the pool
//! 4. Stops both loops on enter or Ctrl-C and prints a final frame

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use rendergrid_autoscale::{AutoscaleConfig, Autoscaler};
use rendergrid_core::random::from_seed;
use rendergrid_core::{RenderGenerator, SimConfig};
use rendergrid_pool::{WorkGenerator, WorkerPool};

use crate::display::render_frame;
use crate::terminal::{self, Screen};

/// Cadence of the autoscale-and-display loop.
const CONTROL_INTERVAL: Duration = Duration::from_millis(100);

const POOL_NAME: &str = "random";

pub async fn run(config: SimConfig) -> anyhow::Result<()> {
    info!(?config, "simulation starting");

    let rng = from_seed(config.seed);
    let pool = Arc::new(WorkerPool::new(
        POOL_NAME,
        config.worker_count,
        config.worker_slots,
        rng.clone(),
    ));
    let renders = RenderGenerator::new(config.mean_latency_ms, config.std_dev_latency_ms, rng);
    let generator = WorkGenerator::new(pool.clone(), renders, config.rps);
    let autoscaler = Autoscaler::new(AutoscaleConfig::from(&config));

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    terminal::exit_on_enter(shutdown_tx.clone());
    terminal::exit_on_ctrl_c(shutdown_tx.clone());

    // ── Background work ────────────────────────────────────────

    let generator_shutdown = shutdown_rx.clone();
    let generator_handle = tokio::spawn(async move {
        generator.run(generator_shutdown).await;
    });

    // ── Control loop ───────────────────────────────────────────

    let mut screen = Screen::enter()?;
    let mut shutdown = shutdown_rx;
    let mut ticker = tokio::time::interval(CONTROL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                control_step(&autoscaler, &pool).await;
                screen.draw(&frame(&pool, config.rps).await)?;
            }
            _ = shutdown.changed() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = generator_handle.await;

    screen.leave()?;
    print!("{}", frame(&pool, config.rps).await);

    info!("simulation stopped");
    Ok(())
}

/// One autoscale step. Guard violations are logged, never fatal.
async fn control_step(autoscaler: &Autoscaler, pool: &WorkerPool) {
    if let Err(e) = autoscaler.evaluate(pool).await {
        warn!(error = %e, "autoscale step failed");
    }
}

async fn frame(pool: &WorkerPool, rps: u32) -> String {
    let stats = pool.stats().await;
    let workers = pool.worker_views().await;
    render_frame(pool.name(), &stats, &workers, rps)
}

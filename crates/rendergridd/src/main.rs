//! rendergridd — the RenderGrid simulator.
//!
//! Runs a pool of simulated render workers fed at a fixed request rate,
//! autoscales the pool on its error rate, and redraws the pool state in
//! the terminal every 100ms. Press enter (or Ctrl-C) to stop.
//!
//! # Usage
//!
//! ```text
//! rendergridd --worker-count 12 --worker-slots 15 --rps 50 --target-error-rate 0.001
//! rendergridd --config rendergrid.toml --seed 42
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rendergrid_core::SimConfig;

mod display;
mod simulation;
mod terminal;

/// Log filter used when `RUST_LOG` is unset; stdout belongs to the view.
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser, Debug)]
#[command(
    name = "rendergridd",
    about = "Render worker pool simulator with error-rate autoscaling",
    version
)]
struct Cli {
    /// TOML config file; flags override values from it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mean latency of a render (ms).
    #[arg(short = 'l', long)]
    mean_latency: Option<f64>,

    /// Standard deviation of render latency (ms).
    #[arg(short = 'd', long)]
    std_dev_latency: Option<f64>,

    /// Number of workers at startup.
    #[arg(short = 'w', long)]
    worker_count: Option<usize>,

    /// Slots per worker.
    #[arg(short = 's', long)]
    worker_slots: Option<usize>,

    /// Target error rate (0.001 is three nines).
    #[arg(short = 'e', long)]
    target_error_rate: Option<f64>,

    /// Autoscale delay in seconds; 1-10 is reasonable.
    #[arg(short = 'a', long)]
    autoscale_delay: Option<u64>,

    /// Renders to spawn per second (max 999).
    #[arg(short = 'r', long)]
    rps: Option<u32>,

    /// Never autoscale below this many workers.
    #[arg(long)]
    min_workers: Option<usize>,

    /// Seed the random source for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,

    /// Print the effective config as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Defaults, then the config file, then flags.
    fn sim_config(&self) -> anyhow::Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_file(path)?,
            None => SimConfig::default(),
        };

        if let Some(v) = self.mean_latency {
            config.mean_latency_ms = v;
        }
        if let Some(v) = self.std_dev_latency {
            config.std_dev_latency_ms = v;
        }
        if let Some(v) = self.worker_count {
            config.worker_count = v;
        }
        if let Some(v) = self.worker_slots {
            config.worker_slots = v;
        }
        if let Some(v) = self.target_error_rate {
            config.target_error_rate = v;
        }
        if let Some(v) = self.autoscale_delay {
            config.autoscale_delay_secs = v;
        }
        if let Some(v) = self.rps {
            config.rps = v;
        }
        if let Some(v) = self.min_workers {
            config.min_workers = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = cli.sim_config()?;
    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    simulation::run(config).await
}

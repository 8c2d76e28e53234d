//! rendergrid-pool — a pool of render workers.
//!
//! The pool routes each render to a uniformly random worker and turns
//! per-worker counters into pool-wide statistics. Totals are built from
//! per-worker deltas, so they survive workers being removed.
//!
//! # Architecture
//!
//! ```text
//! WorkGenerator (every 1s / rps)
//!   └── WorkerPool::submit_random(render)
//!         ├── RandomSelector (uniform index into the live workers)
//!         └── RwLock<PoolState>
//!               ├── Vec<Worker> (insertion order, tail removal)
//!               ├── StatsAccumulator (running totals, avg utilization)
//!               └── autoscale cooldown instant
//! ```

pub mod error;
pub mod generator;
pub mod pool;
pub mod selector;
pub mod stats;

pub use error::{PoolError, PoolResult};
pub use generator::WorkGenerator;
pub use pool::WorkerPool;
pub use selector::RandomSelector;
pub use stats::{PoolStats, StatsAccumulator};

//! rendergrid-autoscale — error-rate driven pool sizing.
//!
//! Reads `PoolStats` from the worker pool, compares the observed error
//! rate against a target, and adds or removes one worker. Cooldown
//! windows gate how soon the next action may follow.
//!
//! # Scaling Algorithm
//!
//! ```text
//! if now < pool.autoscale_cooldown:
//!     NoChange
//!
//! rate = pool.stats().error_rate      // None until a render finishes or fails
//!
//! if rate > target:
//!     add 1 worker;    cooldown = now + delay
//! elif rate < target / 1.1 and workers > min_workers:
//!     remove 1 worker; cooldown = now + 2 * delay
//! else:
//!     NoChange                        // dead-band [target / 1.1, target]
//! ```
//!
//! Scale-down waits twice as long as scale-up, so the pool leans towards
//! spare capacity instead of oscillating.

pub mod scaler;

pub use scaler::{AutoscaleConfig, Autoscaler, ScaleDecision};

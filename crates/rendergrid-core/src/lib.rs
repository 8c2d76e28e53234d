//! rendergrid-core — shared building blocks for the RenderGrid simulator.
//!
//! - [`Render`]: one simulated unit of work with a sampled duration
//! - [`RenderGenerator`]: samples renders from a normal latency distribution
//! - [`RandomSource`]: injected randomness, shared by generators and pools
//! - [`SimConfig`]: simulation settings loaded from TOML and validated

pub mod config;
pub mod random;
pub mod render;

pub use config::{ConfigError, SimConfig, MAX_RPS};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use render::{Render, RenderGenerator, RENDER_ID_SPACE};

//! Renders: the unit of work handed to workers.

use std::sync::Arc;
use std::time::Duration;

use crate::random::RandomSource;

/// Renders carry a display id in `0..RENDER_ID_SPACE` so it always fits
/// in two hex digits.
pub const RENDER_ID_SPACE: u8 = 254;

/// One simulated render.
///
/// The duration is kept as sampled, in whole milliseconds, and may be
/// zero or negative. [`Render::duration`] clamps it for sleeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Render {
    id: u8,
    duration_ms: i64,
}

impl Render {
    pub fn new(id: u8, duration_ms: i64) -> Self {
        Self { id, duration_ms }
    }

    /// Cosmetic identifier, only used for visualization.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Sampled duration in milliseconds, possibly non-positive.
    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    /// How long the render occupies a slot. Non-positive samples
    /// complete immediately.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.duration_ms).unwrap_or(0))
    }

    /// Sample a render: `round(N(0,1) * std_dev + mean)` ms and a uniform id.
    pub fn sample(mean_ms: f64, std_dev_ms: f64, rng: &dyn RandomSource) -> Self {
        let duration_ms = (rng.standard_normal() * std_dev_ms + mean_ms).round() as i64;
        let id = rng.index(RENDER_ID_SPACE as usize) as u8;
        Self { id, duration_ms }
    }
}

/// Produces renders from a fixed latency distribution.
#[derive(Clone)]
pub struct RenderGenerator {
    mean_ms: f64,
    std_dev_ms: f64,
    rng: Arc<dyn RandomSource>,
}

impl RenderGenerator {
    pub fn new(mean_ms: f64, std_dev_ms: f64, rng: Arc<dyn RandomSource>) -> Self {
        Self {
            mean_ms,
            std_dev_ms,
            rng,
        }
    }

    pub fn generate(&self) -> Render {
        Render::sample(self.mean_ms, self.std_dev_ms, self.rng.as_ref())
    }

    pub fn mean_ms(&self) -> f64 {
        self.mean_ms
    }

    pub fn std_dev_ms(&self) -> f64 {
        self.std_dev_ms
    }
}

impl std::fmt::Debug for RenderGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderGenerator")
            .field("mean_ms", &self.mean_ms)
            .field("std_dev_ms", &self.std_dev_ms)
            .finish_non_exhaustive()
    }
}

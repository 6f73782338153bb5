//! Jittered iteration schedule.
//!
//! The loop sleeps a uniformly random whole number of minutes between
//! iterations so that several stations on one network do not all rescan
//! at the same moment.
//!
//! ```text
//!   iteration ──▶ next_wait() ∈ [min, max] minutes ──▶ Pause ──▶ iteration
//! ```

use std::time::Duration;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::RoamConfig;

// ═══════════════════════════════════════════════════════════════
//  Window
// ═══════════════════════════════════════════════════════════════

/// Inclusive wait bounds in minutes.  `min <= max` is guaranteed by
/// config validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitWindow {
    pub min_minutes: u32,
    pub max_minutes: u32,
}

impl WaitWindow {
    pub fn new(min_minutes: u32, max_minutes: u32) -> Self {
        Self {
            min_minutes: min_minutes.min(max_minutes),
            max_minutes: max_minutes.max(min_minutes),
        }
    }

    pub fn from_config(config: &RoamConfig) -> Self {
        Self::new(config.min_wait_minutes, config.max_wait_minutes)
    }

    pub fn min(&self) -> Duration {
        minutes(self.min_minutes)
    }

    pub fn max(&self) -> Duration {
        minutes(self.max_minutes)
    }
}

fn minutes(m: u32) -> Duration {
    Duration::from_secs(u64::from(m) * 60)
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// Draws wait durations from a [`WaitWindow`].
pub struct IntervalScheduler<R = StdRng> {
    window: WaitWindow,
    rng: R,
}

impl IntervalScheduler<StdRng> {
    /// Entropy-seeded scheduler for production.
    pub fn new(window: WaitWindow) -> Self {
        Self::with_rng(window, StdRng::from_entropy())
    }

    /// Deterministic scheduler for tests.
    pub fn seeded(window: WaitWindow, seed: u64) -> Self {
        Self::with_rng(window, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> IntervalScheduler<R> {
    pub fn with_rng(window: WaitWindow, rng: R) -> Self {
        Self { window, rng }
    }

    pub fn window(&self) -> WaitWindow {
        self.window
    }

    /// Next wait, whole minutes in `[min, max]` converted to seconds.
    pub fn next_wait(&mut self) -> Duration {
        let m = self
            .rng
            .gen_range(self.window.min_minutes..=self.window.max_minutes);
        debug!(
            "next wait {m} min (window {}..={})",
            self.window.min_minutes, self.window.max_minutes
        );
        minutes(m)
    }
}

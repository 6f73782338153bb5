//! Bounded polling.
//!
//! One helper used by discovery, roam verification and the address wait:
//! try a probe, pause, try again, up to a fixed number of attempts.  Every
//! pause goes through the [`Pause`] port so a shutdown request ends the
//! poll at the next gap.

use std::time::Duration;

use crate::app::ports::Pause;

/// Result of [`poll_until`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The probe produced a value on attempt `attempt` (1-based).
    Ready { value: T, attempt: u32 },
    /// Every attempt came back empty.
    Exhausted { attempts: u32 },
    /// Shutdown was requested during a pause.
    Interrupted,
}

/// Run `probe` up to `max_attempts` times, pausing `interval` between
/// attempts (never after the last one).  `probe` receives the 1-based
/// attempt number.
pub fn poll_until<T>(
    pause: &dyn Pause,
    interval: Duration,
    max_attempts: u32,
    mut probe: impl FnMut(u32) -> Option<T>,
) -> PollOutcome<T> {
    for attempt in 1..=max_attempts {
        if let Some(value) = probe(attempt) {
            return PollOutcome::Ready { value, attempt };
        }
        if attempt < max_attempts && !pause.pause(interval) {
            return PollOutcome::Interrupted;
        }
    }
    PollOutcome::Exhausted {
        attempts: max_attempts,
    }
}

//! Runtime counters.
//!
//! The loop feeds every iteration's result into [`RoamStats`]; a JSON
//! snapshot is logged every `stats_every` iterations and once at
//! shutdown.

use serde::{Deserialize, Serialize};

use crate::app::reconciler::AddressOutcome;
use crate::fsm::context::RoamOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoamStats {
    pub iterations: u64,
    pub scan_failures: u64,
    pub single_candidate_cycles: u64,
    /// Selection found nothing worth roaming to.
    pub roams_skipped: u64,
    pub roams_attempted: u64,
    pub roams_succeeded: u64,
    pub roams_degraded: u64,
    pub roams_failed: u64,
    /// Association changed between iterations without us roaming.
    pub external_changes: u64,
    pub address_renewals: u64,
    pub address_partial: u64,
    pub address_failures: u64,
}

impl RoamStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_roam(&mut self, outcome: &RoamOutcome) {
        match outcome {
            RoamOutcome::AlreadyConnected(_) => self.roams_skipped += 1,
            RoamOutcome::Connected(_) => {
                self.roams_attempted += 1;
                self.roams_succeeded += 1;
            }
            RoamOutcome::Degraded { .. } => {
                self.roams_attempted += 1;
                self.roams_degraded += 1;
            }
            RoamOutcome::Failed(_) => {
                self.roams_attempted += 1;
                self.roams_failed += 1;
            }
        }
    }

    pub fn record_address(&mut self, outcome: &AddressOutcome) {
        match outcome {
            AddressOutcome::Healthy { .. } | AddressOutcome::Interrupted => {}
            AddressOutcome::Acquired { .. } => self.address_renewals += 1,
            AddressOutcome::Partial { .. } => {
                self.address_renewals += 1;
                self.address_partial += 1;
            }
            AddressOutcome::Failed { .. } => self.address_failures += 1,
        }
    }

    /// Whether a periodic snapshot is due after the current iteration.
    pub fn snapshot_due(&self, every: u64) -> bool {
        every > 0 && self.iterations > 0 && self.iterations % every == 0
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }
}

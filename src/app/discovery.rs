//! Access point discovery.
//!
//! One discovery run triggers a scan, waits for it to settle, pulls the
//! report and merges every extraction pass into a de-duplicated candidate
//! list for the target SSID.  Empty attempts are retried a fixed number of
//! times through [`poll_until`].

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::TimingConfig;
use crate::domain::{AccessPointRecord, Bssid, ScanEntry};
use crate::error::ScanError;
use crate::poll::{PollOutcome, poll_until};

use super::ports::{Pause, ScanReport, WirelessControl};

/// Retry bounds for one discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverySettings {
    pub attempts: u32,
    pub settle: Duration,
    pub retry_delay: Duration,
}

impl From<&TimingConfig> for DiscoverySettings {
    fn from(t: &TimingConfig) -> Self {
        Self {
            attempts: t.scan_attempts,
            settle: t.scan_settle(),
            retry_delay: t.scan_retry_delay(),
        }
    }
}

/// Discover every AP broadcasting `ssid`.
///
/// Never returns an empty list: zero candidates after the last attempt is
/// [`ScanError::NoCandidates`].
pub fn discover<C: WirelessControl + ?Sized>(
    control: &mut C,
    pause: &dyn Pause,
    ssid: &str,
    settings: &DiscoverySettings,
) -> Result<Vec<AccessPointRecord>, ScanError> {
    let outcome = poll_until(pause, settings.retry_delay, settings.attempts, |attempt| {
        if let Err(e) = control.scan() {
            warn!("scan trigger failed (attempt {attempt}/{}): {e}", settings.attempts);
            return None;
        }
        if !pause.pause(settings.settle) {
            return None;
        }
        let report = match control.scan_results() {
            Ok(report) => report,
            Err(e) => {
                warn!("scan results unavailable (attempt {attempt}/{}): {e}", settings.attempts);
                return None;
            }
        };
        let candidates = candidates_for(&report, ssid);
        if candidates.is_empty() {
            info!(
                "no APs for '{ssid}' in {} raw entries (attempt {attempt}/{})",
                report.total_entries(),
                settings.attempts
            );
            return None;
        }
        Some(candidates)
    });

    match outcome {
        PollOutcome::Ready { value, .. } => Ok(value),
        PollOutcome::Interrupted => Err(ScanError::Interrupted),
        PollOutcome::Exhausted { .. } if pause.shutdown_requested() => Err(ScanError::Interrupted),
        PollOutcome::Exhausted { attempts } => Err(ScanError::NoCandidates { attempts }),
    }
}

/// Merge and filter one report into complete records for `ssid`.
pub fn candidates_for(report: &ScanReport, ssid: &str) -> Vec<AccessPointRecord> {
    merge_passes(report)
        .into_iter()
        .filter_map(|entry| complete_record(entry, ssid))
        .collect()
}

/// Union every pass, one entry per BSSID in first-seen order.
///
/// The first entry that carries signal and frequency together wins those
/// two fields.  Values stitched from partial entries only stand in until
/// such an entry turns up.  The SSID is filled from any pass.
pub fn merge_passes(report: &ScanReport) -> Vec<ScanEntry> {
    let mut merged: Vec<ScanEntry> = Vec::new();
    // Per slot: whether a single entry supplied the signal and frequency.
    let mut observed_full: Vec<bool> = Vec::new();
    let mut index: HashMap<Bssid, usize> = HashMap::new();

    for pass in &report.passes {
        for entry in &pass.entries {
            let Some(bssid) = entry.bssid else {
                continue;
            };
            match index.get(&bssid) {
                Some(&slot) => {
                    let existing = &mut merged[slot];
                    if !observed_full[slot] && entry.is_full() {
                        existing.frequency_mhz = entry.frequency_mhz;
                        existing.signal_dbm = entry.signal_dbm;
                        observed_full[slot] = true;
                    }
                    existing.fill_from(entry);
                }
                None => {
                    index.insert(bssid, merged.len());
                    merged.push(entry.clone());
                    observed_full.push(entry.is_full());
                }
            }
        }
    }
    merged
}

fn complete_record(entry: ScanEntry, ssid: &str) -> Option<AccessPointRecord> {
    let (Some(bssid), Some(frequency), Some(signal)) =
        (entry.bssid, entry.frequency_mhz, entry.signal_dbm)
    else {
        debug!("dropping incomplete scan entry {entry:?}");
        return None;
    };
    if bssid.is_zero() {
        return None;
    }
    let name = entry.ssid.unwrap_or_default();
    if name.is_empty() {
        info!("ignoring {bssid}: empty or hidden SSID");
        return None;
    }
    if name != ssid {
        return None;
    }
    Some(AccessPointRecord::new(bssid, frequency, signal, name))
}

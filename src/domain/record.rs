//! Access point observations.

use serde::Serialize;

use super::band::{Band, band_for_frequency};
use super::bssid::Bssid;

/// One AP as seen in one discovery cycle.  Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessPointRecord {
    pub bssid: Bssid,
    pub frequency_mhz: u32,
    pub signal_dbm: i32,
    pub ssid: String,
}

impl AccessPointRecord {
    pub fn new(bssid: Bssid, frequency_mhz: u32, signal_dbm: i32, ssid: impl Into<String>) -> Self {
        Self {
            bssid,
            frequency_mhz,
            signal_dbm,
            ssid: ssid.into(),
        }
    }

    pub fn band(&self) -> Band {
        band_for_frequency(self.frequency_mhz)
    }
}

/// A possibly-incomplete observation produced by one extraction strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanEntry {
    pub bssid: Option<Bssid>,
    pub frequency_mhz: Option<u32>,
    pub signal_dbm: Option<i32>,
    pub ssid: Option<String>,
}

impl ScanEntry {
    pub fn for_bssid(bssid: Bssid) -> Self {
        Self {
            bssid: Some(bssid),
            ..Self::default()
        }
    }

    /// Bssid, signal and frequency all present.
    pub fn is_full(&self) -> bool {
        self.bssid.is_some() && self.signal_dbm.is_some() && self.frequency_mhz.is_some()
    }

    /// Fill every field still missing here from `other`.
    pub fn fill_from(&mut self, other: &ScanEntry) {
        if self.frequency_mhz.is_none() {
            self.frequency_mhz = other.frequency_mhz;
        }
        if self.signal_dbm.is_none() {
            self.signal_dbm = other.signal_dbm;
        }
        if self.ssid.as_deref().is_none_or(str::is_empty) {
            if let Some(ssid) = other.ssid.as_deref().filter(|s| !s.is_empty()) {
                self.ssid = Some(ssid.to_owned());
            }
        }
    }
}

/// Parse a signal level, truncating decimals toward zero (`-52.75` → `-52`).
pub fn parse_signal_dbm(raw: &str) -> Option<i32> {
    let num = raw.split_whitespace().next()?;
    let value: f64 = num.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < f64::from(i32::MIN) || truncated > f64::from(i32::MAX) {
        return None;
    }
    Some(truncated as i32)
}

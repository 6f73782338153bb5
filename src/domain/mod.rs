//! Value types shared by every layer: hardware addresses, bands and
//! per-cycle access point records.

pub mod band;
pub mod bssid;
pub mod record;

pub use band::{Band, BandPreference, band_for_frequency};
pub use bssid::Bssid;
pub use record::{AccessPointRecord, ScanEntry};

//! Candidate selection.  Pure: no I/O, no clock.

use crate::domain::{AccessPointRecord, BandPreference, Bssid};

/// What [`select_next`] decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Roam to this record.
    Target(&'a AccessPointRecord),
    /// Nothing passed the signal floor.
    NoneAboveFloor,
    /// Everything that passed the floor is the current AP.
    OnlyCurrent,
}

impl Selection<'_> {
    /// `(bssid, found)`; the bssid is `None` whenever `found` is false.
    pub fn target(&self) -> (Option<Bssid>, bool) {
        match self {
            Self::Target(record) => (Some(record.bssid), true),
            Self::NoneAboveFloor | Self::OnlyCurrent => (None, false),
        }
    }
}

/// Records at or above the signal floor, in input order.
pub fn above_floor(
    records: &[AccessPointRecord],
    min_signal_dbm: i32,
) -> impl Iterator<Item = &AccessPointRecord> {
    records.iter().filter(move |r| r.signal_dbm >= min_signal_dbm)
}

/// Pick the next roam target.
///
/// 1. drop records below `min_signal_dbm`;
/// 2. drop the current BSSID (when known);
/// 3. strongest record on the preferred band, else strongest overall.
///
/// Ties keep the earliest record.
pub fn select_next<'a>(
    records: &'a [AccessPointRecord],
    current: Option<Bssid>,
    min_signal_dbm: i32,
    preferred: BandPreference,
) -> Selection<'a> {
    let passing: Vec<&AccessPointRecord> = above_floor(records, min_signal_dbm).collect();
    if passing.is_empty() {
        return Selection::NoneAboveFloor;
    }

    let others: Vec<&AccessPointRecord> = passing
        .into_iter()
        .filter(|r| current.is_none_or(|c| c != r.bssid))
        .collect();

    let on_preferred = strongest(others.iter().copied().filter(|r| preferred.matches(r.band())));
    match on_preferred.or_else(|| strongest(others.iter().copied())) {
        Some(record) => Selection::Target(record),
        None => Selection::OnlyCurrent,
    }
}

fn strongest<'a>(
    candidates: impl Iterator<Item = &'a AccessPointRecord>,
) -> Option<&'a AccessPointRecord> {
    candidates.fold(None, |best, r| match best {
        Some(b) if b.signal_dbm >= r.signal_dbm => Some(b),
        _ => Some(r),
    })
}

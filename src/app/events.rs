//! Outbound roaming events.
//!
//! The [`RoamingLoop`](super::service::RoamingLoop) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Every event carries
//! the iteration number; [`RoamEvent::phase`] yields the phase tag used
//! in log lines.

use core::fmt;
use std::net::Ipv4Addr;

use crate::domain::{AccessPointRecord, Band, Bssid};
use crate::error::Error;

/// The four phases of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Scan,
    Select,
    Roam,
    Connectivity,
}

impl Phase {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Select => "select",
            Self::Roam => "roam",
            Self::Connectivity => "connectivity",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Why no roam target was chosen this iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Discovery found a single candidate.
    SingleCandidate,
    /// No candidate met the signal floor.
    NoneAboveFloor,
    /// The only candidate above the floor is the current AP.
    OnlyCurrent,
}

impl SkipReason {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::SingleCandidate => "single candidate",
            Self::NoneAboveFloor => "no candidate above signal floor",
            Self::OnlyCurrent => "only the current AP qualifies",
        }
    }
}

/// Structured events emitted by the roaming core.
#[derive(Debug, Clone)]
pub enum RoamEvent {
    /// Association refreshed at the top of the iteration.
    Association {
        iteration: u64,
        bssid: Option<Bssid>,
        /// The refreshed value differs from what the session believed.
        changed: bool,
        rssi_dbm: Option<i32>,
    },

    /// Discovery finished with at least one candidate.
    Discovered {
        iteration: u64,
        candidates: Vec<AccessPointRecord>,
    },

    /// A target was chosen.
    Selected {
        iteration: u64,
        target: Bssid,
        band: Band,
        signal_dbm: i32,
    },

    /// No roam this iteration.
    Skipped { iteration: u64, reason: SkipReason },

    /// The roam executor finished.
    Roamed {
        iteration: u64,
        target: Bssid,
        actual: Bssid,
        already: bool,
    },

    /// Address health check finished with an address.
    AddressReady {
        iteration: u64,
        address: Ipv4Addr,
        strategy: Option<&'static str>,
        gateway_ok: bool,
    },

    /// A phase failed; the loop carries on.
    PhaseFailed {
        iteration: u64,
        phase: Phase,
        error: Error,
    },
}

impl RoamEvent {
    pub fn iteration(&self) -> u64 {
        match self {
            Self::Association { iteration, .. }
            | Self::Discovered { iteration, .. }
            | Self::Selected { iteration, .. }
            | Self::Skipped { iteration, .. }
            | Self::Roamed { iteration, .. }
            | Self::AddressReady { iteration, .. }
            | Self::PhaseFailed { iteration, .. } => *iteration,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Self::Association { .. } | Self::Roamed { .. } => Phase::Roam,
            Self::Discovered { .. } => Phase::Scan,
            Self::Selected { .. } | Self::Skipped { .. } => Phase::Select,
            Self::AddressReady { .. } => Phase::Connectivity,
            Self::PhaseFailed { phase, .. } => *phase,
        }
    }
}

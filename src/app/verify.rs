//! "Who am I associated with?": three independent queries tried in order.

use core::fmt;

use log::debug;

use crate::domain::Bssid;

use super::ports::Station;

/// One way of asking for the live BSSID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMethod {
    SupplicantStatus,
    LinkConnected,
    LegacyLinkInfo,
}

impl VerifyMethod {
    /// Order in which the methods are tried.
    pub const CHAIN: [Self; 3] = [
        Self::SupplicantStatus,
        Self::LinkConnected,
        Self::LegacyLinkInfo,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::SupplicantStatus => "supplicant-status",
            Self::LinkConnected => "link-connected",
            Self::LegacyLinkInfo => "legacy-link-info",
        }
    }

    /// Run this method alone.  Zero addresses and errors count as "no answer".
    pub fn query(self, station: &mut dyn Station) -> Option<Bssid> {
        let answer = match self {
            Self::SupplicantStatus => station.status().map(|s| s.bssid),
            Self::LinkConnected => station.link_bssid(),
            Self::LegacyLinkInfo => station.legacy_bssid(),
        };
        match answer {
            Ok(bssid) => bssid.filter(|b| !b.is_zero()),
            Err(e) => {
                debug!("{} query failed: {e}", self.name());
                None
            }
        }
    }
}

impl fmt::Display for VerifyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First usable BSSID from the chain, with the method that produced it.
pub fn current_association(station: &mut dyn Station) -> Option<(Bssid, VerifyMethod)> {
    VerifyMethod::CHAIN
        .into_iter()
        .find_map(|method| method.query(station).map(|b| (b, method)))
}

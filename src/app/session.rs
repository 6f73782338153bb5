//! The loop's belief about the current association.

use crate::domain::Bssid;

/// Owned by the roaming loop and passed explicitly; never global.
///
/// `current_bssid` only ever holds a value reported by a verification
/// query, never a BSSID that was merely requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoamingSession {
    current_bssid: Option<Bssid>,
    first_connection: bool,
    iteration: u64,
}

impl Default for RoamingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RoamingSession {
    pub fn new() -> Self {
        Self {
            current_bssid: None,
            first_connection: true,
            iteration: 0,
        }
    }

    pub fn current_bssid(&self) -> Option<Bssid> {
        self.current_bssid
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn is_first_connection(&self) -> bool {
        self.first_connection
    }

    /// Bump the counter and return the new iteration number (1-based).
    pub fn begin_iteration(&mut self) -> u64 {
        self.iteration += 1;
        self.iteration
    }

    /// Replace the belief with a freshly queried association.  Returns
    /// `true` when it differs from what was believed.
    pub fn observe(&mut self, live: Option<Bssid>) -> bool {
        let changed = self.current_bssid != live;
        self.current_bssid = live;
        changed
    }

    /// Record a BSSID confirmed by the roam executor.
    pub fn confirm(&mut self, verified: Bssid) {
        self.current_bssid = Some(verified);
    }

    /// The first address check after an association always renews.
    pub fn wants_initial_renew(&self) -> bool {
        self.first_connection && self.current_bssid.is_some()
    }

    /// An address is in place on a known association.
    pub fn mark_connected(&mut self) {
        if self.current_bssid.is_some() {
            self.first_connection = false;
        }
    }
}

//! Shared mutable context threaded through every roam state handler.
//!
//! `RoamContext` is the blackboard the handlers read from and write to:
//! the station being driven, the roam request, probe bookkeeping and the
//! final outcome.  It lives for exactly one roam.

use std::time::Duration;

use crate::app::ports::{Pause, Station};
use crate::app::verify::VerifyMethod;
use crate::config::TimingConfig;
use crate::domain::Bssid;
use crate::error::RoamError;

// ---------------------------------------------------------------------------
// Request and settings
// ---------------------------------------------------------------------------

/// What the caller wants: a BSSID on a named network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoamRequest {
    pub target: Bssid,
    pub ssid: String,
    /// Session's last verified BSSID.
    pub cached: Option<Bssid>,
}

/// Verification window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifySettings {
    pub attempts: u32,
    pub interval: Duration,
}

impl From<&TimingConfig> for VerifySettings {
    fn from(t: &TimingConfig) -> Self {
        Self {
            attempts: t.verify_attempts,
            interval: t.verify_interval(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// How the roam command reached the supplicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPath {
    Roam,
    /// Alternate path: explicit network selection by id.
    SelectNetwork(u32),
}

/// Result of one roam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoamOutcome {
    /// Already on the target; nothing was sent.
    AlreadyConnected(Bssid),
    /// Verified on the target.
    Connected(Bssid),
    /// Verified on the SSID, but on another AP.
    Degraded { target: Bssid, actual: Bssid },
    Failed(RoamError),
}

impl RoamOutcome {
    /// The verified BSSID, when there is one.
    pub fn verified_bssid(&self) -> Option<Bssid> {
        match self {
            Self::AlreadyConnected(b) | Self::Connected(b) => Some(*b),
            Self::Degraded { actual, .. } => Some(*actual),
            Self::Failed(_) => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

// ---------------------------------------------------------------------------
// RoamContext
// ---------------------------------------------------------------------------

/// The context passed to every state handler function.
pub struct RoamContext<'a> {
    // -- Ports --
    pub station: &'a mut dyn Station,
    pub pause: &'a dyn Pause,

    // -- Inputs --
    pub request: RoamRequest,
    pub verify: VerifySettings,

    // -- Progress --
    /// Set by `Idle` when no command is needed.
    pub already_connected: bool,
    pub command_path: Option<CommandPath>,
    pub probes: u32,
    /// Verified BSSID and the method that reported it.
    pub actual: Option<(Bssid, VerifyMethod)>,
    pub failure: Option<RoamError>,

    // -- Output --
    pub outcome: Option<RoamOutcome>,
}

impl<'a> RoamContext<'a> {
    pub fn new(
        station: &'a mut dyn Station,
        pause: &'a dyn Pause,
        request: RoamRequest,
        verify: VerifySettings,
    ) -> Self {
        Self {
            station,
            pause,
            request,
            verify,
            already_connected: false,
            command_path: None,
            probes: 0,
            actual: None,
            failure: None,
            outcome: None,
        }
    }

    pub fn target(&self) -> Bssid {
        self.request.target
    }

    /// Record a failure unless one is already recorded.
    pub fn fail(&mut self, error: RoamError) {
        self.failure.get_or_insert(error);
    }
}

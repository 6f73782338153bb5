//! Port traits: the hexagonal boundary between roaming logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RoamingLoop (domain)
//! ```
//!
//! Driven adapters (supplicant control, link queries, address management,
//! event sinks, sleeping) implement these traits.  The
//! [`RoamingLoop`](super::service::RoamingLoop) consumes them through
//! generics and trait objects, so the domain core never spawns a process
//! or parses tool output itself.
//!
//! All raw text is turned into the typed structs below inside the adapter
//! layer.

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::domain::{Bssid, ScanEntry};
use crate::error::{CommandError, ControlError};

// ───────────────────────────────────────────────────────────────
// Wireless control (driven adapter: domain ↔ supplicant)
// ───────────────────────────────────────────────────────────────

/// Typed access to the supplicant's control interface.
///
/// Every call is bounded by a timeout inside the adapter.  Calls take
/// `&mut self` so one owner serializes everything sent to an interface.
pub trait WirelessControl {
    /// Trigger a scan.  A scan that is already running counts as success.
    fn scan(&mut self) -> Result<(), ControlError>;

    /// Collect the raw scan data as ordered extraction passes.
    fn scan_results(&mut self) -> Result<ScanReport, ControlError>;

    fn status(&mut self) -> Result<SupplicantStatus, ControlError>;

    /// Ask the supplicant to reassociate with `bssid` on the current network.
    fn roam(&mut self, bssid: Bssid) -> Result<(), ControlError>;

    fn signal_poll(&mut self) -> Result<SignalPoll, ControlError>;

    /// Networks configured in the supplicant, in its own order.
    fn list_networks(&mut self) -> Result<Vec<ConfiguredNetwork>, ControlError>;

    fn select_network(&mut self, id: u32) -> Result<(), ControlError>;
}

// ───────────────────────────────────────────────────────────────
// Link-layer queries (verification fallbacks)
// ───────────────────────────────────────────────────────────────

pub trait LinkQuery {
    /// BSSID from the kernel's "Connected to" link report.
    fn link_bssid(&mut self) -> Result<Option<Bssid>, ControlError>;

    /// BSSID from the legacy wireless-extensions "Access Point" field.
    fn legacy_bssid(&mut self) -> Result<Option<Bssid>, ControlError>;
}

/// Everything the roam executor talks to: one station interface.
pub trait Station: WirelessControl + LinkQuery {}

impl<T: WirelessControl + LinkQuery + ?Sized> Station for T {}

// ───────────────────────────────────────────────────────────────
// IP layer (driven adapter: domain ↔ kernel routing/addressing)
// ───────────────────────────────────────────────────────────────

pub trait NetworkPort {
    /// First IPv4 address bound to the interface, if any.
    fn ipv4_address(&mut self) -> Result<Option<Ipv4Addr>, CommandError>;

    /// Default route gateway through the interface, if any.
    fn default_gateway(&mut self) -> Result<Option<Ipv4Addr>, CommandError>;

    /// Single ICMP probe through the interface.
    fn gateway_reachable(&mut self, gateway: Ipv4Addr) -> bool;

    /// Administratively bring the interface down or up.
    fn set_link(&mut self, up: bool) -> Result<(), CommandError>;
}

// ───────────────────────────────────────────────────────────────
// Lease management (driven adapter: domain ↔ DHCP clients)
// ───────────────────────────────────────────────────────────────

/// The two DHCP clients the reconciler can drive: a long-running
/// daemon and a one-shot client.
pub trait LeasePort {
    fn daemon_available(&mut self) -> bool;

    fn daemon_running(&mut self) -> bool;

    /// Whether the daemon's runtime-state directory exists and is writable.
    fn state_dir_writable(&mut self) -> bool;

    /// Release then renew the interface lease through the running daemon.
    fn daemon_release_renew(&mut self) -> Result<(), CommandError>;

    /// Start the daemon for the interface.
    fn daemon_start(&mut self) -> Result<(), CommandError>;

    fn oneshot_available(&mut self) -> bool;

    fn oneshot_release(&mut self) -> Result<(), CommandError>;

    /// Request a lease and wait (bounded) for it.
    fn oneshot_request(&mut self) -> Result<(), CommandError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`RoamEvent`](super::events::RoamEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::RoamEvent);
}

// ───────────────────────────────────────────────────────────────
// Pause port (every sleep in the system)
// ───────────────────────────────────────────────────────────────

/// Interruptible sleep.
pub trait Pause {
    /// Sleep for `duration`.  Returns `false` if shutdown was requested
    /// before or during the sleep.
    fn pause(&self, duration: Duration) -> bool;

    fn shutdown_requested(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Port data types
// ───────────────────────────────────────────────────────────────

/// Raw scan data after parsing, one pass per extraction strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub passes: Vec<ExtractionPass>,
}

impl ScanReport {
    pub fn push(&mut self, strategy: &'static str, entries: Vec<ScanEntry>) {
        self.passes.push(ExtractionPass { strategy, entries });
    }

    pub fn total_entries(&self) -> usize {
        self.passes.iter().map(|p| p.entries.len()).sum()
    }
}

/// Entries produced by one parser over one raw source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPass {
    pub strategy: &'static str,
    pub entries: Vec<ScanEntry>,
}

/// Parsed `status` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplicantStatus {
    pub bssid: Option<Bssid>,
    pub ssid: Option<String>,
    pub frequency_mhz: Option<u32>,
    pub wpa_state: Option<String>,
}

impl SupplicantStatus {
    pub fn is_completed(&self) -> bool {
        self.wpa_state.as_deref() == Some("COMPLETED")
    }
}

/// Parsed `signal_poll` reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalPoll {
    pub rssi_dbm: Option<i32>,
    pub frequency_mhz: Option<u32>,
    pub link_speed_mbps: Option<u32>,
}

/// One row of `list_networks`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredNetwork {
    pub id: u32,
    pub ssid: String,
    /// Pinned BSSID, `None` for `any`.
    pub bssid: Option<Bssid>,
    pub flags: String,
}

//! Mock adapters for integration tests.
//!
//! `MockStation` simulates a supplicant plus link-layer tools over a small
//! in-memory radio world.  `MockNet` and `MockLease` share one
//! [`NetWorld`] so a successful lease command makes an address appear.
//! Every call is recorded so tests can assert on the full history.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::rc::Rc;
use std::time::Duration;

use roamd::app::events::RoamEvent;
use roamd::app::ports::{
    ConfiguredNetwork, EventSink, LeasePort, LinkQuery, NetworkPort, Pause, ScanReport,
    SignalPoll, SupplicantStatus, WirelessControl,
};
use roamd::domain::{Bssid, ScanEntry};
use roamd::error::{CommandError, ControlError};

pub const NET: &str = "Net";

pub fn bssid(last: u8) -> Bssid {
    Bssid::new([0x02, 0x00, 0x00, 0x00, 0x00, last])
}

pub fn entry(last: u8, frequency_mhz: u32, signal_dbm: i32, ssid: &str) -> ScanEntry {
    ScanEntry {
        bssid: Some(bssid(last)),
        frequency_mhz: Some(frequency_mhz),
        signal_dbm: Some(signal_dbm),
        ssid: Some(ssid.to_owned()),
    }
}

pub fn report(entries: Vec<ScanEntry>) -> ScanReport {
    let mut r = ScanReport::default();
    r.push("bss-blocks", entries);
    r
}

fn failed(program: &str) -> CommandError {
    CommandError::Failed {
        program: program.to_owned(),
        status: Some(1),
        stderr: String::new(),
    }
}

// ── Station ───────────────────────────────────────────────────

/// How the supplicant reacts to `roam`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoamBehavior {
    /// Associate with the requested BSSID.
    Accept,
    /// Say `OK` but end up on another AP.
    LandOn(Bssid),
    /// Say `OK` but never report any association.
    Vanish,
    /// Reply `FAIL`.
    Reject,
    /// Hit the command timeout.
    TimeOut,
}

/// Which verification sources can see the association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub status: bool,
    pub link: bool,
    pub legacy: bool,
}

impl Visibility {
    pub const ALL: Self = Self {
        status: true,
        link: true,
        legacy: true,
    };
}

pub struct MockStation {
    pub associated: Option<Bssid>,
    /// Network the supplicant reports while associated.
    pub ssid: String,
    pub reports: VecDeque<Result<ScanReport, ControlError>>,
    pub roam_behavior: RoamBehavior,
    pub networks: Vec<ConfiguredNetwork>,
    pub select_ok: bool,
    pub visibility: Visibility,
    pub rssi_dbm: Option<i32>,
    pub calls: Vec<String>,
}

#[allow(dead_code)]
impl MockStation {
    pub fn new() -> Self {
        Self {
            associated: None,
            ssid: NET.to_owned(),
            reports: VecDeque::new(),
            roam_behavior: RoamBehavior::Accept,
            networks: vec![ConfiguredNetwork {
                id: 0,
                ssid: NET.to_owned(),
                bssid: None,
                flags: "[CURRENT]".to_owned(),
            }],
            select_ok: true,
            visibility: Visibility::ALL,
            rssi_dbm: Some(-65),
            calls: Vec::new(),
        }
    }

    pub fn on(mut self, ap: Bssid) -> Self {
        self.associated = Some(ap);
        self
    }

    pub fn with_scan(mut self, report: ScanReport) -> Self {
        self.reports.push_back(Ok(report));
        self
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl Default for MockStation {
    fn default() -> Self {
        Self::new()
    }
}

impl WirelessControl for MockStation {
    fn scan(&mut self) -> Result<(), ControlError> {
        self.calls.push("scan".into());
        Ok(())
    }

    fn scan_results(&mut self) -> Result<ScanReport, ControlError> {
        self.calls.push("scan_results".into());
        match self.reports.len() {
            0 => Ok(ScanReport::default()),
            1 => self.reports.front().cloned().unwrap_or(Ok(ScanReport::default())),
            _ => self.reports.pop_front().unwrap_or(Ok(ScanReport::default())),
        }
    }

    fn status(&mut self) -> Result<SupplicantStatus, ControlError> {
        self.calls.push("status".into());
        let bssid = self.associated.filter(|_| self.visibility.status);
        Ok(SupplicantStatus {
            bssid,
            ssid: bssid.map(|_| self.ssid.clone()),
            frequency_mhz: None,
            wpa_state: Some(if bssid.is_some() { "COMPLETED" } else { "SCANNING" }.into()),
        })
    }

    fn roam(&mut self, bssid: Bssid) -> Result<(), ControlError> {
        self.calls.push(format!("roam {bssid}"));
        match self.roam_behavior {
            RoamBehavior::Accept => {
                self.associated = Some(bssid);
                Ok(())
            }
            RoamBehavior::LandOn(other) => {
                self.associated = Some(other);
                Ok(())
            }
            RoamBehavior::Vanish => {
                self.associated = None;
                Ok(())
            }
            RoamBehavior::Reject => Err(ControlError::Rejected {
                op: "roam",
                reply: "FAIL".into(),
            }),
            RoamBehavior::TimeOut => Err(ControlError::Command(CommandError::TimedOut {
                program: "wpa_cli".into(),
                after: Duration::from_secs(10),
            })),
        }
    }

    fn signal_poll(&mut self) -> Result<SignalPoll, ControlError> {
        self.calls.push("signal_poll".into());
        Ok(SignalPoll {
            rssi_dbm: self.rssi_dbm,
            ..SignalPoll::default()
        })
    }

    fn list_networks(&mut self) -> Result<Vec<ConfiguredNetwork>, ControlError> {
        self.calls.push("list_networks".into());
        Ok(self.networks.clone())
    }

    fn select_network(&mut self, id: u32) -> Result<(), ControlError> {
        self.calls.push(format!("select_network {id}"));
        if !self.select_ok {
            return Err(ControlError::Rejected {
                op: "select_network",
                reply: "FAIL".into(),
            });
        }
        // The supplicant picks an AP of the network on its own.
        let pinned = self.networks.iter().find(|n| n.id == id).and_then(|n| n.bssid);
        if let Some(ap) = pinned {
            self.associated = Some(ap);
        }
        Ok(())
    }
}

impl LinkQuery for MockStation {
    fn link_bssid(&mut self) -> Result<Option<Bssid>, ControlError> {
        self.calls.push("link".into());
        Ok(self.associated.filter(|_| self.visibility.link))
    }

    fn legacy_bssid(&mut self) -> Result<Option<Bssid>, ControlError> {
        self.calls.push("legacy".into());
        if self.visibility.legacy {
            Ok(self.associated)
        } else {
            Err(ControlError::Command(CommandError::Spawn {
                program: "iwconfig".into(),
                reason: "not installed".into(),
            }))
        }
    }
}

// ── Network + leases ──────────────────────────────────────────

/// Addressing state shared by `MockNet` and `MockLease`.
#[derive(Debug, Default)]
pub struct NetWorld {
    pub address: Option<Ipv4Addr>,
    pub gateway: Option<Ipv4Addr>,
    pub gateway_up: bool,
    /// Address handed out by whichever lease command succeeds.
    pub lease: Option<Ipv4Addr>,
    /// Strategy whose success also brings the gateway back.
    pub gateway_heals_on: Option<&'static str>,
    pub calls: Vec<String>,
}

pub type SharedWorld = Rc<RefCell<NetWorld>>;

pub fn healthy_world() -> SharedWorld {
    Rc::new(RefCell::new(NetWorld {
        address: Some(Ipv4Addr::new(10, 0, 0, 5)),
        gateway: Some(Ipv4Addr::new(10, 0, 0, 1)),
        gateway_up: true,
        lease: Some(Ipv4Addr::new(10, 0, 0, 5)),
        gateway_heals_on: None,
        calls: Vec::new(),
    }))
}

pub struct MockNet {
    pub world: SharedWorld,
    /// Whether bringing the link back up restores the lease.
    pub link_cycle_heals: bool,
}

impl MockNet {
    pub fn new(world: SharedWorld) -> Self {
        Self {
            world,
            link_cycle_heals: false,
        }
    }
}

impl NetworkPort for MockNet {
    fn ipv4_address(&mut self) -> Result<Option<Ipv4Addr>, CommandError> {
        let w = self.world.borrow();
        Ok(w.address)
    }

    fn default_gateway(&mut self) -> Result<Option<Ipv4Addr>, CommandError> {
        let w = self.world.borrow();
        Ok(w.gateway.filter(|_| w.address.is_some()))
    }

    fn gateway_reachable(&mut self, gateway: Ipv4Addr) -> bool {
        let mut w = self.world.borrow_mut();
        w.calls.push(format!("ping {gateway}"));
        w.gateway_up
    }

    fn set_link(&mut self, up: bool) -> Result<(), CommandError> {
        let mut w = self.world.borrow_mut();
        w.calls.push(format!("link {}", if up { "up" } else { "down" }));
        if up {
            if self.link_cycle_heals {
                w.address = w.lease;
            }
        } else {
            w.address = None;
        }
        Ok(())
    }
}

pub struct MockLease {
    pub world: SharedWorld,
    pub daemon_installed: bool,
    pub daemon_running: bool,
    pub state_dir_writable: bool,
    pub oneshot_installed: bool,
    /// Strategy names whose commands hand out `world.lease`.
    pub grants: Vec<&'static str>,
}

#[allow(dead_code)]
impl MockLease {
    pub fn new(world: SharedWorld) -> Self {
        Self {
            world,
            daemon_installed: true,
            daemon_running: true,
            state_dir_writable: true,
            oneshot_installed: true,
            grants: vec!["daemon-renew", "daemon-start", "oneshot"],
        }
    }

    fn act(&mut self, call: &str, strategy: &'static str) -> Result<(), CommandError> {
        let mut w = self.world.borrow_mut();
        w.calls.push(call.to_owned());
        if self.grants.contains(&strategy) {
            w.address = w.lease;
            if w.gateway_heals_on == Some(strategy) {
                w.gateway_up = true;
            }
            Ok(())
        } else {
            Err(failed(call))
        }
    }
}

impl LeasePort for MockLease {
    fn daemon_available(&mut self) -> bool {
        self.daemon_installed
    }

    fn daemon_running(&mut self) -> bool {
        self.daemon_running
    }

    fn state_dir_writable(&mut self) -> bool {
        self.state_dir_writable
    }

    fn daemon_release_renew(&mut self) -> Result<(), CommandError> {
        self.act("daemon renew", "daemon-renew")
    }

    fn daemon_start(&mut self) -> Result<(), CommandError> {
        self.act("daemon start", "daemon-start")
    }

    fn oneshot_available(&mut self) -> bool {
        self.oneshot_installed
    }

    fn oneshot_release(&mut self) -> Result<(), CommandError> {
        let mut w = self.world.borrow_mut();
        w.calls.push("oneshot release".into());
        w.address = None;
        Ok(())
    }

    fn oneshot_request(&mut self) -> Result<(), CommandError> {
        self.act("oneshot request", "oneshot")
    }
}

// ── Pause + sink ──────────────────────────────────────────────

/// Records every pause without sleeping.  With `stop_after = Some(n)`
/// the n-th pause (1-based) reports shutdown.
#[derive(Default)]
pub struct InstantPause {
    pub pauses: RefCell<Vec<Duration>>,
    pub stop_after: Option<usize>,
    stopped: Cell<bool>,
}

#[allow(dead_code)]
impl InstantPause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stopping_after(n: usize) -> Self {
        Self {
            stop_after: Some(n),
            ..Self::default()
        }
    }

    pub fn total(&self) -> Duration {
        self.pauses.borrow().iter().sum()
    }
}

impl Pause for InstantPause {
    fn pause(&self, duration: Duration) -> bool {
        let mut pauses = self.pauses.borrow_mut();
        pauses.push(duration);
        if self.stop_after.is_some_and(|n| pauses.len() >= n) {
            self.stopped.set(true);
        }
        !self.stopped.get()
    }

    fn shutdown_requested(&self) -> bool {
        self.stopped.get()
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<RoamEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &RoamEvent) {
        self.events.push(event.clone());
    }
}

//! Wireless station adapter.
//!
//! Implements [`WirelessControl`] over `wpa_cli -i IF` and [`LinkQuery`]
//! over `iw dev IF link` / `iwconfig IF`.  Every call takes `&mut self`,
//! so commands against one interface never interleave.
//!
//! ## Scan sources
//!
//! `scan_results` gathers two raw sources and hands every extraction pass
//! to discovery, which merges them:
//!
//! | Pass                  | Source                                  |
//! |-----------------------|-----------------------------------------|
//! | `bss-blocks`          | `iw dev IF scan` (or `scan dump`)       |
//! | `line-fallback`       | same `iw` text, line oriented           |
//! | `scan-results-table`  | `wpa_cli -i IF scan_results`            |
//!
//! A failing source is logged and skipped; only when both fail does the
//! call fail.

use std::time::Duration;

use log::{debug, warn};

use crate::app::ports::{
    ConfiguredNetwork, LinkQuery, ScanReport, SignalPoll, SupplicantStatus, WirelessControl,
};
use crate::config::TimingConfig;
use crate::domain::Bssid;
use crate::error::{CommandError, ControlError};

use super::command::{CommandRunner, SystemRunner};
use super::parse::{self, BSS_BLOCKS, LINE_FALLBACK, SCAN_RESULTS_TABLE};
use super::utils::MacFinder;

const WPA_CLI: &str = "wpa_cli";
const IW: &str = "iw";
const IWCONFIG: &str = "iwconfig";

/// Command bounds used by the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationTimeouts {
    pub command: Duration,
    pub scan: Duration,
    pub roam: Duration,
}

impl From<&TimingConfig> for StationTimeouts {
    fn from(t: &TimingConfig) -> Self {
        Self {
            command: t.command_timeout(),
            scan: t.scan_timeout(),
            roam: t.roam_timeout(),
        }
    }
}

pub struct StationAdapter<R: CommandRunner = SystemRunner> {
    runner: R,
    interface: String,
    timeouts: StationTimeouts,
    macs: MacFinder,
}

impl<R: CommandRunner> StationAdapter<R> {
    pub fn new(
        runner: R,
        interface: impl Into<String>,
        timeouts: StationTimeouts,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            runner,
            interface: interface.into(),
            timeouts,
            macs: MacFinder::new()?,
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// `wpa_cli -i IF <args>`, returning stdout.
    fn wpa(&mut self, args: &[&str], timeout: Duration) -> Result<String, CommandError> {
        let mut full = vec!["-i", self.interface.as_str()];
        full.extend_from_slice(args);
        Ok(self.runner.run_ok(WPA_CLI, &full, timeout)?.stdout)
    }

    /// Run a `wpa_cli` command that must answer `OK`.
    fn wpa_expect_ok(
        &mut self,
        op: &'static str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<(), ControlError> {
        let reply = self.wpa(args, timeout)?;
        if parse::is_ok_reply(&reply) {
            Ok(())
        } else {
            Err(ControlError::Rejected { op, reply })
        }
    }

    fn iw_dump(&mut self) -> Result<String, CommandError> {
        let timeout = self.timeouts.scan;
        let iface = self.interface.clone();
        match self.runner.run_ok(IW, &["dev", &iface, "scan"], timeout) {
            Ok(out) => Ok(out.stdout),
            Err(e) => {
                debug!("iw scan failed ({e}), falling back to cached dump");
                Ok(self
                    .runner
                    .run_ok(IW, &["dev", &iface, "scan", "dump"], timeout)?
                    .stdout)
            }
        }
    }
}

impl<R: CommandRunner> WirelessControl for StationAdapter<R> {
    fn scan(&mut self) -> Result<(), ControlError> {
        let reply = self.wpa(&["scan"], self.timeouts.command)?;
        if parse::is_scan_accepted(&reply) {
            Ok(())
        } else {
            Err(ControlError::Rejected { op: "scan", reply })
        }
    }

    fn scan_results(&mut self) -> Result<ScanReport, ControlError> {
        let mut report = ScanReport::default();
        let mut sources = 0;

        match self.iw_dump() {
            Ok(dump) => {
                sources += 1;
                report.push(BSS_BLOCKS, parse::parse_bss_blocks(&dump));
                report.push(LINE_FALLBACK, parse::parse_line_fallback(&dump, &self.macs));
            }
            Err(e) => warn!("iw scan dump unavailable on {}: {e}", self.interface),
        }

        match self.wpa(&["scan_results"], self.timeouts.command) {
            Ok(table) => {
                sources += 1;
                report.push(SCAN_RESULTS_TABLE, parse::parse_scan_results(&table));
            }
            Err(e) => warn!("wpa_cli scan_results unavailable on {}: {e}", self.interface),
        }

        if sources == 0 {
            return Err(ControlError::NoScanData);
        }
        debug!(
            "scan report: {} entries over {} passes",
            report.total_entries(),
            report.passes.len()
        );
        Ok(report)
    }

    fn status(&mut self) -> Result<SupplicantStatus, ControlError> {
        let text = self.wpa(&["status"], self.timeouts.command)?;
        Ok(parse::parse_status(&text))
    }

    fn roam(&mut self, bssid: Bssid) -> Result<(), ControlError> {
        let target = bssid.to_string();
        self.wpa_expect_ok("roam", &["roam", &target], self.timeouts.roam)
    }

    fn signal_poll(&mut self) -> Result<SignalPoll, ControlError> {
        let text = self.wpa(&["signal_poll"], self.timeouts.command)?;
        Ok(parse::parse_signal_poll(&text))
    }

    fn list_networks(&mut self) -> Result<Vec<ConfiguredNetwork>, ControlError> {
        let text = self.wpa(&["list_networks"], self.timeouts.command)?;
        Ok(parse::parse_list_networks(&text))
    }

    fn select_network(&mut self, id: u32) -> Result<(), ControlError> {
        let id = id.to_string();
        self.wpa_expect_ok("select_network", &["select_network", &id], self.timeouts.command)
    }
}

impl<R: CommandRunner> LinkQuery for StationAdapter<R> {
    fn link_bssid(&mut self) -> Result<Option<Bssid>, ControlError> {
        let iface = self.interface.clone();
        let out = self
            .runner
            .run_ok(IW, &["dev", &iface, "link"], self.timeouts.command)?;
        Ok(parse::parse_iw_link(&out.stdout))
    }

    fn legacy_bssid(&mut self) -> Result<Option<Bssid>, ControlError> {
        let iface = self.interface.clone();
        let out = self
            .runner
            .run_ok(IWCONFIG, &[&iface], self.timeouts.command)?;
        Ok(parse::parse_iwconfig(&out.stdout))
    }
}

//! Pure parsers for the text the wireless and network tools print.
//!
//! Nothing here runs a command; every function maps `&str` to values and
//! tolerates arbitrary input (see the fuzz targets).

use std::net::Ipv4Addr;

use crate::app::ports::{ConfiguredNetwork, SignalPoll, SupplicantStatus};
use crate::domain::record::parse_signal_dbm;
use crate::domain::{Bssid, ScanEntry};

use super::utils::{MacFinder, key_value, unquote};

/// Extraction pass names, in the order the station adapter runs them.
pub const BSS_BLOCKS: &str = "bss-blocks";
pub const LINE_FALLBACK: &str = "line-fallback";
pub const SCAN_RESULTS_TABLE: &str = "scan-results-table";

// ───────────────────────────────────────────────────────────────
// Scan output
// ───────────────────────────────────────────────────────────────

/// Block parser over `iw dev IF scan`.  A block opens on a line starting
/// with `BSS ` and collects `freq:`, `signal:` and the first `SSID:`.
pub fn parse_bss_blocks(text: &str) -> Vec<ScanEntry> {
    let mut entries = Vec::new();
    let mut current: Option<ScanEntry> = None;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("BSS ") {
            entries.extend(current.take());
            let token = rest
                .split(|c: char| c == '(' || c.is_whitespace())
                .next()
                .unwrap_or_default();
            current = Bssid::parse(token).ok().map(ScanEntry::for_bssid);
            continue;
        }
        if let Some(entry) = current.as_mut() {
            fill_field(entry, line.trim());
        }
    }
    entries.extend(current);
    entries
}

/// Line-oriented fallback over the same dump.  Any line carrying a MAC
/// opens a record, so missing indentation or `BSS` prefixes do not matter.
pub fn parse_line_fallback(text: &str, macs: &MacFinder) -> Vec<ScanEntry> {
    let mut entries = Vec::new();
    let mut current: Option<ScanEntry> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(entry) = current.as_mut() {
            if fill_field(entry, trimmed) {
                continue;
            }
        }
        if let Some(bssid) = macs.find(trimmed) {
            entries.extend(current.take());
            current = Some(ScanEntry::for_bssid(bssid));
        }
    }
    entries.extend(current);
    entries
}

/// Returns `true` when the line was one of the recognised fields.
fn fill_field(entry: &mut ScanEntry, trimmed: &str) -> bool {
    if let Some(rest) = trimmed.strip_prefix("freq:") {
        if entry.frequency_mhz.is_none() {
            entry.frequency_mhz = parse_frequency(rest);
        }
        true
    } else if let Some(rest) = trimmed.strip_prefix("signal:") {
        if entry.signal_dbm.is_none() {
            entry.signal_dbm = parse_signal_dbm(rest);
        }
        true
    } else if let Some(rest) = trimmed.strip_prefix("SSID:") {
        if entry.ssid.is_none() {
            entry.ssid = Some(unquote(rest).to_owned());
        }
        true
    } else {
        false
    }
}

/// `2437`, `2437.0` or `5180 MHz`.
fn parse_frequency(raw: &str) -> Option<u32> {
    let token = raw.split_whitespace().next()?;
    if let Ok(mhz) = token.parse::<u32>() {
        return Some(mhz);
    }
    let value: f64 = token.parse().ok()?;
    (0.0..=f64::from(u32::MAX))
        .contains(&value)
        .then(|| value.trunc() as u32)
}

/// Tab-delimited `wpa_cli scan_results`:
/// `bssid / frequency / signal level / flags / ssid`.  Rows whose first
/// column is not a MAC (the header, `Selected interface` banners) are
/// skipped.
pub fn parse_scan_results(text: &str) -> Vec<ScanEntry> {
    text.lines()
        .filter_map(|line| {
            let mut cols = line.split('\t');
            let bssid = Bssid::parse(cols.next()?).ok()?;
            let frequency_mhz = cols.next().and_then(parse_frequency);
            let signal_dbm = cols.next().and_then(parse_signal_dbm);
            let _flags = cols.next();
            let ssid = cols.collect::<Vec<_>>().join("\t");
            Some(ScanEntry {
                bssid: Some(bssid),
                frequency_mhz,
                signal_dbm,
                ssid: Some(ssid),
            })
        })
        .collect()
}

// ───────────────────────────────────────────────────────────────
// Supplicant replies
// ───────────────────────────────────────────────────────────────

/// `wpa_cli` acknowledges commands with a bare `OK`.
pub fn is_ok_reply(stdout: &str) -> bool {
    stdout.lines().any(|l| l.trim() == "OK")
}

/// A scan already in progress is as good as a new one.
pub fn is_scan_accepted(stdout: &str) -> bool {
    is_ok_reply(stdout) || stdout.lines().any(|l| l.trim() == "FAIL-BUSY")
}

pub fn parse_status(text: &str) -> SupplicantStatus {
    let mut status = SupplicantStatus::default();
    for line in text.lines() {
        if let Some(v) = key_value(line, "bssid") {
            status.bssid = Bssid::parse(v).ok();
        } else if let Some(v) = key_value(line, "ssid") {
            status.ssid = Some(v.to_owned());
        } else if let Some(v) = key_value(line, "freq") {
            status.frequency_mhz = parse_frequency(v);
        } else if let Some(v) = key_value(line, "wpa_state") {
            status.wpa_state = Some(v.to_owned());
        }
    }
    status
}

pub fn parse_signal_poll(text: &str) -> SignalPoll {
    let mut poll = SignalPoll::default();
    for line in text.lines() {
        if let Some(v) = key_value(line, "RSSI") {
            poll.rssi_dbm = parse_signal_dbm(v);
        } else if let Some(v) = key_value(line, "FREQUENCY") {
            poll.frequency_mhz = parse_frequency(v);
        } else if let Some(v) = key_value(line, "LINKSPEED") {
            poll.link_speed_mbps = v.parse().ok();
        }
    }
    poll
}

/// Tab-delimited `list_networks`: `network id / ssid / bssid / flags`.
/// A bssid column of `any` means the network is not pinned.
pub fn parse_list_networks(text: &str) -> Vec<ConfiguredNetwork> {
    text.lines()
        .filter_map(|line| {
            let mut cols = line.split('\t');
            let id = cols.next()?.trim().parse().ok()?;
            let ssid = cols.next()?.to_owned();
            let bssid = cols.next().and_then(|b| Bssid::parse(b).ok());
            let flags = cols.next().unwrap_or_default().trim().to_owned();
            Some(ConfiguredNetwork {
                id,
                ssid,
                bssid,
                flags,
            })
        })
        .collect()
}

// ───────────────────────────────────────────────────────────────
// Link queries
// ───────────────────────────────────────────────────────────────

/// `iw dev IF link`: `Connected to aa:bb:..(on wlan0)` or `Not connected.`
pub fn parse_iw_link(text: &str) -> Option<Bssid> {
    text.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("Connected to ")?;
        let token = rest.split(|c: char| c == '(' || c.is_whitespace()).next()?;
        Bssid::parse(token).ok()
    })
}

/// `iwconfig IF`: `Access Point: AA:BB:..` or `Access Point: Not-Associated`.
pub fn parse_iwconfig(text: &str) -> Option<Bssid> {
    text.lines().find_map(|line| {
        let (_, rest) = line.split_once("Access Point:")?;
        Bssid::parse(rest.split_whitespace().next()?).ok()
    })
}

// ───────────────────────────────────────────────────────────────
// Addressing
// ───────────────────────────────────────────────────────────────

/// First `inet A.B.C.D/NN` in `ip -4 -o addr show dev IF`.
pub fn parse_ipv4_address(text: &str) -> Option<Ipv4Addr> {
    text.lines().find_map(|line| {
        let mut words = line.split_whitespace();
        words.find(|w| *w == "inet")?;
        let cidr = words.next()?;
        cidr.split('/').next()?.parse().ok()
    })
}

/// `default via A.B.C.D ...` in `ip -4 route show default dev IF`.
pub fn parse_default_gateway(text: &str) -> Option<Ipv4Addr> {
    text.lines().find_map(|line| {
        let mut words = line.split_whitespace();
        if words.next()? != "default" {
            return None;
        }
        words.find(|w| *w == "via")?;
        words.next()?.parse().ok()
    })
}

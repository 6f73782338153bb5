//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every [`RoamEvent`] as one log line
//! tagged `iter=N phase=<tag>`, so a single iteration can be followed with
//! `grep iter=42`.

use log::{Level, log};

use crate::app::events::RoamEvent;
use crate::app::ports::EventSink;
use crate::domain::AccessPointRecord;

/// Adapter that logs every [`RoamEvent`] through the `log` facade.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &RoamEvent) {
        let (level, body) = describe(event);
        log!(
            level,
            "iter={} phase={} | {body}",
            event.iteration(),
            event.phase()
        );
    }
}

/// Level and message body for one event.
pub fn describe(event: &RoamEvent) -> (Level, String) {
    match event {
        RoamEvent::Association {
            bssid,
            changed,
            rssi_dbm,
            ..
        } => {
            let ap = bssid.map_or_else(|| "none".to_owned(), |b| b.to_string());
            let rssi = rssi_dbm.map_or_else(|| "?".to_owned(), |r| r.to_string());
            let note = if *changed { " (changed)" } else { "" };
            (Level::Info, format!("associated={ap} rssi={rssi}dBm{note}"))
        }
        RoamEvent::Discovered { candidates, .. } => (
            Level::Info,
            format!("{} candidate(s): {}", candidates.len(), summarize(candidates)),
        ),
        RoamEvent::Selected {
            target,
            band,
            signal_dbm,
            ..
        } => (
            Level::Info,
            format!("target={target} band={band} signal={signal_dbm}dBm"),
        ),
        RoamEvent::Skipped { reason, .. } => {
            (Level::Info, format!("no roam: {}", reason.describe()))
        }
        RoamEvent::Roamed {
            target,
            actual,
            already,
            ..
        } => {
            if *already {
                (Level::Info, format!("already on {actual}"))
            } else if target == actual {
                (Level::Info, format!("roamed to {actual}"))
            } else {
                (
                    Level::Warn,
                    format!("degraded: wanted {target}, associated with {actual}"),
                )
            }
        }
        RoamEvent::AddressReady {
            address,
            strategy,
            gateway_ok,
            ..
        } => {
            let via = strategy.map_or_else(String::new, |s| format!(" via {s}"));
            if *gateway_ok {
                (Level::Info, format!("address={address}{via} gateway=ok"))
            } else {
                (
                    Level::Warn,
                    format!("address={address}{via} gateway=unreachable (partial)"),
                )
            }
        }
        RoamEvent::PhaseFailed { error, .. } => (Level::Warn, format!("failed: {error}")),
    }
}

fn summarize(candidates: &[AccessPointRecord]) -> String {
    candidates
        .iter()
        .map(|c| format!("{}@{}/{}dBm", c.bssid, c.band(), c.signal_dbm))
        .collect::<Vec<_>>()
        .join(", ")
}

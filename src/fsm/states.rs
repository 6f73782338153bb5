//! Concrete roam state handlers and table builder.
//!
//! ```text
//!  IDLE ──[already on target]──────────────────────────▶ CONNECTED
//!    │
//!  [roam needed]
//!    ▼
//!  ROAMING ──[roam and select_network both failed]────▶ FAILED
//!    │
//!  [command accepted]
//!    ▼
//!  VERIFYING ──[target seen / other AP on SSID]───────▶ CONNECTED
//!            └─[nothing seen / shutdown]───────────────▶ FAILED
//! ```

use log::{debug, info, warn};

use super::context::{CommandPath, RoamContext, RoamOutcome};
use super::{StateDescriptor, StateId};
use crate::app::ports::Station;
use crate::app::verify::{VerifyMethod, current_association};
use crate::domain::Bssid;
use crate::error::RoamError;
use crate::poll::{PollOutcome, poll_until};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table.  Called once per roam.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: None,
            on_exit: None,
            on_update: idle_update,
        },
        // 1: Roaming
        StateDescriptor {
            id: StateId::Roaming,
            name: "Roaming",
            on_enter: Some(roaming_enter),
            on_exit: None,
            on_update: roaming_update,
        },
        // 2: Verifying
        StateDescriptor {
            id: StateId::Verifying,
            name: "Verifying",
            on_enter: Some(verifying_enter),
            on_exit: Some(verifying_exit),
            on_update: verifying_update,
        },
        // 3: Connected
        StateDescriptor {
            id: StateId::Connected,
            name: "Connected",
            on_enter: Some(connected_enter),
            on_exit: None,
            on_update: terminal_update,
        },
        // 4: Failed
        StateDescriptor {
            id: StateId::Failed,
            name: "Failed",
            on_enter: Some(failed_enter),
            on_exit: None,
            on_update: terminal_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: is a roam needed at all?
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update(ctx: &mut RoamContext<'_>) -> Option<StateId> {
    let target = ctx.target();

    if ctx.request.cached == Some(target) {
        info!("IDLE: session already on {target}, nothing to do");
        ctx.already_connected = true;
        ctx.actual = Some((target, VerifyMethod::SupplicantStatus));
        return Some(StateId::Connected);
    }

    if let Some((live, method)) = current_association(&mut *ctx.station) {
        if live == target {
            info!("IDLE: {method} reports {target} already associated");
            ctx.already_connected = true;
            ctx.actual = Some((live, method));
            return Some(StateId::Connected);
        }
    }

    Some(StateId::Roaming)
}

// ═══════════════════════════════════════════════════════════════════════════
//  ROAMING: issue the command, with one alternate path
// ═══════════════════════════════════════════════════════════════════════════

fn roaming_enter(ctx: &mut RoamContext<'_>) {
    let target = ctx.target();
    match ctx.station.roam(target) {
        Ok(()) => {
            info!("ROAMING: roam {target} accepted");
            ctx.command_path = Some(CommandPath::Roam);
        }
        Err(e) => {
            warn!("ROAMING: roam {target} failed ({e}), trying select_network");
            match select_alternate(ctx) {
                Ok(id) => {
                    info!("ROAMING: select_network {id} accepted");
                    ctx.command_path = Some(CommandPath::SelectNetwork(id));
                }
                Err(reason) => ctx.fail(RoamError::CommandFailed {
                    target,
                    reason: format!("{e}; {reason}"),
                }),
            }
        }
    }
}

fn roaming_update(ctx: &mut RoamContext<'_>) -> Option<StateId> {
    if ctx.command_path.is_some() {
        Some(StateId::Verifying)
    } else {
        Some(StateId::Failed)
    }
}

/// Find the configured network for the target (pinned BSSID first, then
/// SSID) and select it once.
fn select_alternate(ctx: &mut RoamContext<'_>) -> Result<u32, String> {
    let target = ctx.target();
    let networks = ctx
        .station
        .list_networks()
        .map_err(|e| format!("list_networks: {e}"))?;
    let id = networks
        .iter()
        .find(|n| n.bssid == Some(target))
        .or_else(|| networks.iter().find(|n| n.ssid == ctx.request.ssid))
        .map(|n| n.id)
        .ok_or_else(|| format!("no configured network for '{}'", ctx.request.ssid))?;
    ctx.station
        .select_network(id)
        .map_err(|e| format!("select_network {id}: {e}"))?;
    Ok(id)
}

// ═══════════════════════════════════════════════════════════════════════════
//  VERIFYING: poll the association until the target shows up
// ═══════════════════════════════════════════════════════════════════════════

fn verifying_enter(ctx: &mut RoamContext<'_>) {
    info!(
        "VERIFYING: up to {} probes every {} ms",
        ctx.verify.attempts,
        ctx.verify.interval.as_millis()
    );
}

fn verifying_exit(ctx: &mut RoamContext<'_>) {
    info!("VERIFYING: done after {} probe(s)", ctx.probes);
}

fn verifying_update(ctx: &mut RoamContext<'_>) -> Option<StateId> {
    let target = ctx.target();
    let station = &mut *ctx.station;
    let ssid = ctx.request.ssid.as_str();
    let mut probes = 0;
    // Another AP, kept only while the supplicant reports the target SSID.
    let mut last_seen: Option<(Bssid, VerifyMethod)> = None;

    let outcome = poll_until(ctx.pause, ctx.verify.interval, ctx.verify.attempts, |n| {
        probes = n;
        match current_association(&mut *station) {
            Some((live, method)) if live == target => Some((live, method)),
            Some((other, method)) => {
                last_seen = on_ssid(&mut *station, ssid).then_some((other, method));
                if last_seen.is_none() {
                    debug!("VERIFYING: {other} is not confirmed on '{ssid}'");
                }
                None
            }
            None => {
                last_seen = None;
                None
            }
        }
    });
    ctx.probes = probes;

    match outcome {
        PollOutcome::Ready { value, .. } => {
            ctx.actual = Some(value);
            Some(StateId::Connected)
        }
        PollOutcome::Interrupted => {
            ctx.fail(RoamError::Interrupted { target });
            Some(StateId::Failed)
        }
        PollOutcome::Exhausted { .. } => match last_seen {
            Some(other) => {
                ctx.actual = Some(other);
                Some(StateId::Connected)
            }
            None => {
                ctx.fail(RoamError::Unverified { target, probes });
                Some(StateId::Failed)
            }
        },
    }
}

/// Whether the supplicant reports `ssid` as the current network.  The link
/// tools carry no SSID, so an unreadable status never confirms.
fn on_ssid(station: &mut dyn Station, ssid: &str) -> bool {
    match station.status() {
        Ok(status) => status.ssid.as_deref() == Some(ssid),
        Err(e) => {
            debug!("VERIFYING: status unavailable for SSID check ({e})");
            false
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONNECTED / FAILED: terminal
// ═══════════════════════════════════════════════════════════════════════════

fn connected_enter(ctx: &mut RoamContext<'_>) {
    let target = ctx.target();
    let Some((actual, method)) = ctx.actual else {
        ctx.outcome = Some(RoamOutcome::Failed(RoamError::Unverified {
            target,
            probes: ctx.probes,
        }));
        return;
    };

    let outcome = if ctx.already_connected {
        RoamOutcome::AlreadyConnected(actual)
    } else if actual == target {
        info!("CONNECTED: {method} confirms {actual}");
        RoamOutcome::Connected(actual)
    } else {
        warn!("CONNECTED: wanted {target} but {method} reports {actual}");
        RoamOutcome::Degraded { target, actual }
    };
    ctx.outcome = Some(outcome);
}

fn failed_enter(ctx: &mut RoamContext<'_>) {
    let error = ctx.failure.clone().unwrap_or(RoamError::Unverified {
        target: ctx.target(),
        probes: ctx.probes,
    });
    warn!("FAILED: {error}");
    ctx.outcome = Some(RoamOutcome::Failed(error));
}

fn terminal_update(_ctx: &mut RoamContext<'_>) -> Option<StateId> {
    None
}

//! Connectivity reconciler.
//!
//! Makes sure the interface holds an IPv4 address with a reachable default
//! gateway.  When it does not (or a renewal is forced) the fallback chain
//! runs in a fixed order, each strategy only when its preconditions hold:
//!
//! ```text
//!  daemon-renew ──▶ daemon-start ──▶ oneshot ──▶ link-cycle
//! ```
//!
//! After each strategy the address is polled briefly instead of waiting
//! one long sleep.

use core::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::TimingConfig;
use crate::error::{AddressError, CommandError};
use crate::poll::{PollOutcome, poll_until};

use super::ports::{LeasePort, NetworkPort, Pause};

/// Address-acquisition strategies, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    DaemonRenew,
    DaemonStart,
    OneShot,
    LinkCycle,
}

impl Strategy {
    pub const CHAIN: [Self; 4] = [
        Self::DaemonRenew,
        Self::DaemonStart,
        Self::OneShot,
        Self::LinkCycle,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::DaemonRenew => "daemon-renew",
            Self::DaemonStart => "daemon-start",
            Self::OneShot => "oneshot",
            Self::LinkCycle => "link-cycle",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of [`Reconciler::ensure_address`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressOutcome {
    /// Address present and gateway reachable; nothing was done.
    Healthy { address: Ipv4Addr },
    /// A strategy produced an address and the gateway answers.
    Acquired {
        address: Ipv4Addr,
        strategy: &'static str,
    },
    /// Address present but the gateway is missing or silent.
    Partial {
        address: Ipv4Addr,
        strategy: &'static str,
    },
    /// Every applicable strategy failed.
    Failed { tried: Vec<&'static str> },
    Interrupted,
}

impl AddressOutcome {
    pub fn acquired(&self) -> bool {
        matches!(
            self,
            Self::Healthy { .. } | Self::Acquired { .. } | Self::Partial { .. }
        )
    }

    pub fn address(&self) -> Option<Ipv4Addr> {
        match self {
            Self::Healthy { address }
            | Self::Acquired { address, .. }
            | Self::Partial { address, .. } => Some(*address),
            Self::Failed { .. } | Self::Interrupted => None,
        }
    }

    /// The error equivalent of an unsuccessful outcome.
    pub fn error(&self) -> Option<AddressError> {
        match self {
            Self::Failed { tried } => Some(AddressError::Exhausted {
                tried: tried.clone(),
            }),
            Self::Interrupted => Some(AddressError::Interrupted),
            _ => None,
        }
    }
}

/// Pauses and poll bounds for the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSettings {
    /// Gap between releasing and requesting, and between link down and up.
    pub release_pause: Duration,
    pub poll_interval: Duration,
    pub poll_attempts: u32,
}

impl From<&TimingConfig> for ReconcileSettings {
    fn from(t: &TimingConfig) -> Self {
        Self {
            release_pause: t.lease_release_pause(),
            poll_interval: t.address_poll_interval(),
            poll_attempts: t.address_poll_attempts,
        }
    }
}

pub struct Reconciler {
    settings: ReconcileSettings,
}

impl Reconciler {
    pub fn new(settings: ReconcileSettings) -> Self {
        Self { settings }
    }

    /// Ensure the interface has a working address.
    ///
    /// With `force_renew` false a bound address is only trusted when the
    /// default gateway answers a probe.
    pub fn ensure_address(
        &self,
        net: &mut dyn NetworkPort,
        lease: &mut dyn LeasePort,
        pause: &dyn Pause,
        force_renew: bool,
    ) -> AddressOutcome {
        let bound = current_address(net);
        match bound {
            Some(address) if !force_renew => {
                if gateway_ok(net) {
                    debug!("{address} bound and gateway reachable");
                    return AddressOutcome::Healthy { address };
                }
                warn!("{address} bound but gateway unreachable, renewing");
            }
            Some(address) => info!("forcing renewal of {address}"),
            None => info!("no IPv4 address bound, acquiring"),
        }
        self.run_chain(net, lease, pause, bound)
    }

    /// Walk the strategies.  A new address without a gateway ends the
    /// chain as `Partial`; getting `stale` back again does not, so the
    /// heavier strategies still run.
    fn run_chain(
        &self,
        net: &mut dyn NetworkPort,
        lease: &mut dyn LeasePort,
        pause: &dyn Pause,
        stale: Option<Ipv4Addr>,
    ) -> AddressOutcome {
        let daemon_running = lease.daemon_running();
        let mut tried = Vec::new();
        let mut partial: Option<&'static str> = None;

        for strategy in Strategy::CHAIN {
            if pause.shutdown_requested() {
                return AddressOutcome::Interrupted;
            }
            if !applicable(strategy, lease, daemon_running) {
                debug!("{strategy} not applicable");
                continue;
            }
            tried.push(strategy.name());
            info!("trying {strategy}");

            match self.run(strategy, net, lease, pause) {
                Ok(true) => {}
                Ok(false) => return AddressOutcome::Interrupted,
                Err(e) => {
                    warn!("{strategy} failed: {e}");
                    continue;
                }
            }

            let wait = poll_until(
                pause,
                self.settings.poll_interval,
                self.settings.poll_attempts,
                |_| current_address(net),
            );
            match wait {
                PollOutcome::Ready { value: address, attempt } => {
                    info!("{strategy} produced {address} after {attempt} check(s)");
                    if gateway_ok(net) {
                        return AddressOutcome::Acquired {
                            address,
                            strategy: strategy.name(),
                        };
                    }
                    if stale != Some(address) {
                        warn!("{address} acquired but gateway missing or unreachable");
                        return AddressOutcome::Partial {
                            address,
                            strategy: strategy.name(),
                        };
                    }
                    warn!("{strategy} kept {address} and the gateway is still unreachable");
                    partial = Some(strategy.name());
                }
                PollOutcome::Interrupted => return AddressOutcome::Interrupted,
                PollOutcome::Exhausted { attempts } => {
                    warn!("{strategy}: no address after {attempts} check(s)");
                }
            }
        }

        match (partial, current_address(net)) {
            (Some(strategy), Some(address)) => AddressOutcome::Partial { address, strategy },
            _ => AddressOutcome::Failed { tried },
        }
    }

    /// Run one strategy's commands.  `Ok(false)` means shutdown cut a pause.
    fn run(
        &self,
        strategy: Strategy,
        net: &mut dyn NetworkPort,
        lease: &mut dyn LeasePort,
        pause: &dyn Pause,
    ) -> Result<bool, CommandError> {
        match strategy {
            Strategy::DaemonRenew => lease.daemon_release_renew().map(|()| true),
            Strategy::DaemonStart => lease.daemon_start().map(|()| true),
            Strategy::OneShot => {
                if let Err(e) = lease.oneshot_release() {
                    debug!("oneshot release: {e}");
                }
                if !pause.pause(self.settings.release_pause) {
                    return Ok(false);
                }
                lease.oneshot_request().map(|()| true)
            }
            Strategy::LinkCycle => {
                net.set_link(false)?;
                if !pause.pause(self.settings.release_pause) {
                    net.set_link(true)?;
                    return Ok(false);
                }
                net.set_link(true).map(|()| true)
            }
        }
    }
}

fn applicable(strategy: Strategy, lease: &mut dyn LeasePort, daemon_running: bool) -> bool {
    match strategy {
        Strategy::DaemonRenew => daemon_running,
        Strategy::DaemonStart => {
            !daemon_running && lease.daemon_available() && lease.state_dir_writable()
        }
        Strategy::OneShot => lease.oneshot_available(),
        Strategy::LinkCycle => true,
    }
}

fn current_address(net: &mut dyn NetworkPort) -> Option<Ipv4Addr> {
    match net.ipv4_address() {
        Ok(address) => address,
        Err(e) => {
            debug!("address query failed: {e}");
            None
        }
    }
}

fn gateway_ok(net: &mut dyn NetworkPort) -> bool {
    match net.default_gateway() {
        Ok(Some(gateway)) => net.gateway_reachable(gateway),
        Ok(None) => false,
        Err(e) => {
            debug!("gateway query failed: {e}");
            false
        }
    }
}

//! Roaming loop: the hexagonal core.
//!
//! [`RoamingLoop`] owns the session, the scheduler and the counters.  All
//! I/O flows through the port handles bundled in [`Ports`], injected at
//! call sites, so the whole loop runs against mock adapters in tests.
//!
//! ```text
//!   Station ──▶ ┌──────────────────────────────────────┐ ──▶ EventSink
//!               │            RoamingLoop               │
//! NetworkPort ◀─│ discover · select · roam · reconcile │
//!   LeasePort ◀─└──────────────────────────────────────┘ ◀── Pause
//! ```

use log::{info, warn};

use crate::config::RoamConfig;
use crate::diagnostics::RoamStats;
use crate::domain::Bssid;
use crate::error::{Error, RoamError, ScanError};
use crate::fsm::context::{RoamOutcome, RoamRequest, VerifySettings};
use crate::scheduler::{IntervalScheduler, WaitWindow};

use super::discovery::{DiscoverySettings, discover};
use super::events::{Phase, RoamEvent, SkipReason};
use super::executor::{RoamExecutor, RoamReport};
use super::ports::{EventSink, LeasePort, NetworkPort, Pause, Station};
use super::reconciler::{AddressOutcome, ReconcileSettings, Reconciler};
use super::selector::{Selection, select_next};
use super::session::RoamingSession;
use super::verify::current_association;

/// Port handles for one call into the loop.
pub struct Ports<'a> {
    pub station: &'a mut dyn Station,
    pub net: &'a mut dyn NetworkPort,
    pub lease: &'a mut dyn LeasePort,
    pub pause: &'a dyn Pause,
    pub sink: &'a mut dyn EventSink,
}

/// What one iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport {
    pub iteration: u64,
    pub candidates: usize,
    pub scan_error: Option<ScanError>,
    pub skipped: Option<SkipReason>,
    pub roam: Option<RoamReport>,
    pub address: Option<AddressOutcome>,
}

impl IterationReport {
    fn new(iteration: u64) -> Self {
        Self {
            iteration,
            candidates: 0,
            scan_error: None,
            skipped: None,
            roam: None,
            address: None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// RoamingLoop
// ───────────────────────────────────────────────────────────────

pub struct RoamingLoop {
    config: RoamConfig,
    session: RoamingSession,
    scheduler: IntervalScheduler,
    executor: RoamExecutor,
    reconciler: Reconciler,
    discovery: DiscoverySettings,
    stats: RoamStats,
}

impl RoamingLoop {
    pub fn new(config: RoamConfig) -> Self {
        let scheduler = IntervalScheduler::new(WaitWindow::from_config(&config));
        Self::with_scheduler(config, scheduler)
    }

    /// Deterministic waits, for tests.
    pub fn seeded(config: RoamConfig, seed: u64) -> Self {
        let scheduler = IntervalScheduler::seeded(WaitWindow::from_config(&config), seed);
        Self::with_scheduler(config, scheduler)
    }

    fn with_scheduler(config: RoamConfig, scheduler: IntervalScheduler) -> Self {
        let timing = &config.timing;
        Self {
            executor: RoamExecutor::new(VerifySettings::from(timing)),
            reconciler: Reconciler::new(ReconcileSettings::from(timing)),
            discovery: DiscoverySettings::from(timing),
            session: RoamingSession::new(),
            stats: RoamStats::new(),
            scheduler,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Iterate until shutdown (or once, with `once`).  Returns the final
    /// counters.
    pub fn run(&mut self, ports: &mut Ports<'_>, once: bool) -> RoamStats {
        info!(
            "roaming '{}' on {} every {}..={} min (floor {} dBm, prefer {})",
            self.config.ssid,
            self.config.interface,
            self.config.min_wait_minutes,
            self.config.max_wait_minutes,
            self.config.min_signal_dbm,
            self.config.preferred_band
        );

        while !ports.pause.shutdown_requested() {
            let report = self.iterate(ports);
            if once {
                break;
            }
            let wait = self.scheduler.next_wait();
            info!(
                "iter={} next iteration in {} s",
                report.iteration,
                wait.as_secs()
            );
            if !ports.pause.pause(wait) {
                break;
            }
        }

        info!(
            "stopping after {} iteration(s): {}",
            self.stats.iterations,
            self.stats.to_json()
        );
        self.stats.clone()
    }

    // ── One iteration ─────────────────────────────────────────

    /// Refresh association, discover, select, roam, then check the address.
    /// Never fails: every problem is reported as an event.
    pub fn iterate(&mut self, ports: &mut Ports<'_>) -> IterationReport {
        let iteration = self.session.begin_iteration();
        self.stats.iterations += 1;
        let mut report = IterationReport::new(iteration);

        self.refresh_association(iteration, ports);

        let mut roamed = false;
        match discover(
            &mut *ports.station,
            ports.pause,
            &self.config.ssid,
            &self.discovery,
        ) {
            Ok(candidates) => {
                report.candidates = candidates.len();
                ports.sink.emit(&RoamEvent::Discovered {
                    iteration,
                    candidates: candidates.clone(),
                });

                if candidates.len() == 1 {
                    self.stats.single_candidate_cycles += 1;
                    report.skipped = Some(SkipReason::SingleCandidate);
                    ports.sink.emit(&RoamEvent::Skipped {
                        iteration,
                        reason: SkipReason::SingleCandidate,
                    });
                } else {
                    let selection = select_next(
                        &candidates,
                        self.session.current_bssid(),
                        self.config.min_signal_dbm,
                        self.config.preferred_band,
                    );
                    match selection {
                        Selection::Target(record) => {
                            ports.sink.emit(&RoamEvent::Selected {
                                iteration,
                                target: record.bssid,
                                band: record.band(),
                                signal_dbm: record.signal_dbm,
                            });
                            let request = RoamRequest {
                                target: record.bssid,
                                ssid: self.config.ssid.clone(),
                                cached: self.session.current_bssid(),
                            };
                            let roam = self.roam(iteration, request, ports);
                            roamed = matches!(
                                roam.outcome,
                                RoamOutcome::Connected(_) | RoamOutcome::Degraded { .. }
                            );
                            let interrupted = matches!(
                                &roam.outcome,
                                RoamOutcome::Failed(RoamError::Interrupted { .. })
                            );
                            report.roam = Some(roam);
                            if interrupted {
                                return report;
                            }
                        }
                        Selection::NoneAboveFloor => {
                            self.skip(iteration, SkipReason::NoneAboveFloor, &mut report, ports);
                        }
                        Selection::OnlyCurrent => {
                            self.skip(iteration, SkipReason::OnlyCurrent, &mut report, ports);
                        }
                    }
                }
            }
            Err(e) => {
                self.stats.scan_failures += 1;
                report.scan_error = Some(e);
                ports.sink.emit(&RoamEvent::PhaseFailed {
                    iteration,
                    phase: Phase::Scan,
                    error: Error::from(e),
                });
                if e == ScanError::Interrupted {
                    return report;
                }
            }
        }

        report.address = Some(self.check_address(iteration, roamed, ports));

        if self.stats.snapshot_due(self.config.stats_every) {
            info!("iter={iteration} stats {}", self.stats.to_json());
        }
        report
    }

    pub fn session(&self) -> &RoamingSession {
        &self.session
    }

    pub fn stats(&self) -> &RoamStats {
        &self.stats
    }

    // ── Internal ──────────────────────────────────────────────

    fn refresh_association(&mut self, iteration: u64, ports: &mut Ports<'_>) {
        let previous = self.session.current_bssid();
        let live = current_association(&mut *ports.station).map(|(bssid, _)| bssid);
        let changed = self.session.observe(live);
        if changed && iteration > 1 {
            self.stats.external_changes += 1;
            warn!(
                "iter={iteration} association changed outside roamd: {} -> {}",
                display_bssid(previous),
                display_bssid(live)
            );
        }
        let rssi_dbm = match ports.station.signal_poll() {
            Ok(poll) => poll.rssi_dbm,
            Err(_) => None,
        };
        ports.sink.emit(&RoamEvent::Association {
            iteration,
            bssid: live,
            changed,
            rssi_dbm,
        });
    }

    fn roam(&mut self, iteration: u64, request: RoamRequest, ports: &mut Ports<'_>) -> RoamReport {
        let target = request.target;
        let report = self.executor.execute(&mut *ports.station, ports.pause, request);
        self.stats.record_roam(&report.outcome);

        if let Some(verified) = report.outcome.verified_bssid() {
            self.session.confirm(verified);
        }
        match &report.outcome {
            RoamOutcome::Failed(e) => ports.sink.emit(&RoamEvent::PhaseFailed {
                iteration,
                phase: Phase::Roam,
                error: Error::from(e.clone()),
            }),
            outcome => {
                if let Some(actual) = outcome.verified_bssid() {
                    ports.sink.emit(&RoamEvent::Roamed {
                        iteration,
                        target,
                        actual,
                        already: matches!(outcome, RoamOutcome::AlreadyConnected(_)),
                    });
                }
            }
        }
        report
    }

    fn skip(
        &mut self,
        iteration: u64,
        reason: SkipReason,
        report: &mut IterationReport,
        ports: &mut Ports<'_>,
    ) {
        self.stats.roams_skipped += 1;
        report.skipped = Some(reason);
        ports.sink.emit(&RoamEvent::Skipped { iteration, reason });
    }

    fn check_address(
        &mut self,
        iteration: u64,
        roamed: bool,
        ports: &mut Ports<'_>,
    ) -> AddressOutcome {
        let force_renew =
            self.session.wants_initial_renew() || (roamed && self.config.renew_after_roam);
        let outcome =
            self.reconciler
                .ensure_address(&mut *ports.net, &mut *ports.lease, ports.pause, force_renew);
        self.stats.record_address(&outcome);

        match &outcome {
            AddressOutcome::Healthy { address } => {
                self.session.mark_connected();
                ports.sink.emit(&RoamEvent::AddressReady {
                    iteration,
                    address: *address,
                    strategy: None,
                    gateway_ok: true,
                });
            }
            AddressOutcome::Acquired { address, strategy } => {
                self.session.mark_connected();
                ports.sink.emit(&RoamEvent::AddressReady {
                    iteration,
                    address: *address,
                    strategy: Some(*strategy),
                    gateway_ok: true,
                });
            }
            AddressOutcome::Partial { address, strategy } => {
                self.session.mark_connected();
                ports.sink.emit(&RoamEvent::AddressReady {
                    iteration,
                    address: *address,
                    strategy: Some(*strategy),
                    gateway_ok: false,
                });
            }
            AddressOutcome::Failed { .. } | AddressOutcome::Interrupted => {
                if let Some(error) = outcome.error() {
                    ports.sink.emit(&RoamEvent::PhaseFailed {
                        iteration,
                        phase: Phase::Connectivity,
                        error: Error::from(error),
                    });
                }
            }
        }
        outcome
    }
}

fn display_bssid(bssid: Option<Bssid>) -> String {
    bssid.map_or_else(|| "none".to_owned(), |b| b.to_string())
}

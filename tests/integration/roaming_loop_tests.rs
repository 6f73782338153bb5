//! Full iterations of the roaming loop against mock ports.

use std::time::Duration;

use roamd::app::events::{Phase, RoamEvent, SkipReason};
use roamd::app::reconciler::AddressOutcome;
use roamd::app::service::{Ports, RoamingLoop};
use roamd::config::{ConfigOverrides, FileConfig, RoamConfig};
use roamd::domain::BandPreference;
use roamd::error::ScanError;
use roamd::fsm::context::RoamOutcome;

use crate::mock_station::{
    InstantPause, MockLease, MockNet, MockStation, NET, RecordingSink, RoamBehavior, bssid, entry,
    healthy_world, report,
};

fn config(min_wait: u32, max_wait: u32) -> RoamConfig {
    RoamConfig::resolve(
        FileConfig::default(),
        ConfigOverrides {
            ssid: Some(NET.to_owned()),
            min_wait_minutes: Some(min_wait),
            max_wait_minutes: Some(max_wait),
            min_signal_dbm: Some(-75),
            preferred_band: Some(BandPreference::Five),
            ..ConfigOverrides::default()
        },
    )
    .unwrap()
}

struct Rig {
    station: MockStation,
    net: MockNet,
    lease: MockLease,
    pause: InstantPause,
    sink: RecordingSink,
}

impl Rig {
    /// Associated with AP 1 (2.4G, -60) with AP 2 (5G, -70) in range.
    fn two_aps() -> Self {
        let world = healthy_world();
        Self {
            station: MockStation::new().on(bssid(1)).with_scan(report(vec![
                entry(1, 2437, -60, NET),
                entry(2, 5180, -70, NET),
            ])),
            net: MockNet::new(world.clone()),
            lease: MockLease::new(world),
            pause: InstantPause::new(),
            sink: RecordingSink::default(),
        }
    }

    fn ports(&mut self) -> Ports<'_> {
        Ports {
            station: &mut self.station,
            net: &mut self.net,
            lease: &mut self.lease,
            pause: &self.pause,
            sink: &mut self.sink,
        }
    }

    fn lease_calls(&self, call: &str) -> usize {
        self.net.world.borrow().calls.iter().filter(|c| *c == call).count()
    }
}

#[test]
fn first_iteration_roams_and_renews() {
    let mut rig = Rig::two_aps();
    let mut roaming = RoamingLoop::seeded(config(1, 2), 7);

    let it = roaming.iterate(&mut rig.ports());

    assert_eq!(it.iteration, 1);
    assert_eq!(it.candidates, 2);
    let roam = it.roam.expect("a roam was attempted");
    assert_eq!(roam.outcome, RoamOutcome::Connected(bssid(2)));
    assert_eq!(
        it.address,
        Some(AddressOutcome::Acquired {
            address: std::net::Ipv4Addr::new(10, 0, 0, 5),
            strategy: "daemon-renew"
        })
    );
    assert_eq!(roaming.session().current_bssid(), Some(bssid(2)));
    assert!(!roaming.session().is_first_connection());

    let phases: Vec<Phase> = rig.sink.events.iter().map(RoamEvent::phase).collect();
    assert_eq!(
        phases,
        vec![
            Phase::Roam,
            Phase::Scan,
            Phase::Select,
            Phase::Roam,
            Phase::Connectivity
        ]
    );
    assert!(rig.sink.events.iter().all(|e| e.iteration() == 1));

    let stats = roaming.stats();
    assert_eq!(stats.iterations, 1);
    assert_eq!(stats.roams_succeeded, 1);
    assert_eq!(stats.address_renewals, 1);
}

#[test]
fn second_iteration_trusts_a_healthy_address() {
    let mut rig = Rig::two_aps();
    let mut roaming = RoamingLoop::seeded(config(1, 2), 7);
    roaming.iterate(&mut rig.ports());

    let it = roaming.iterate(&mut rig.ports());

    // Back to AP 1: it is the only candidate left once AP 2 is excluded.
    assert_eq!(
        it.roam.map(|r| r.outcome),
        Some(RoamOutcome::Connected(bssid(1)))
    );
    assert!(matches!(it.address, Some(AddressOutcome::Healthy { .. })));
    assert_eq!(rig.lease_calls("daemon renew"), 1);
}

#[test]
fn renew_after_roam_forces_renewal_every_time() {
    let mut rig = Rig::two_aps();
    let mut cfg = config(1, 2);
    cfg.renew_after_roam = true;
    let mut roaming = RoamingLoop::seeded(cfg, 7);

    roaming.iterate(&mut rig.ports());
    roaming.iterate(&mut rig.ports());

    assert_eq!(rig.lease_calls("daemon renew"), 2);
}

#[test]
fn single_candidate_skips_selection() {
    let mut rig = Rig::two_aps();
    rig.station.reports.clear();
    rig.station
        .reports
        .push_back(Ok(report(vec![entry(1, 2437, -60, NET)])));
    let mut roaming = RoamingLoop::seeded(config(1, 2), 7);

    let it = roaming.iterate(&mut rig.ports());

    assert_eq!(it.skipped, Some(SkipReason::SingleCandidate));
    assert!(it.roam.is_none());
    assert!(it.address.is_some());
    assert_eq!(rig.station.count("roam"), 0);
    assert_eq!(roaming.stats().single_candidate_cycles, 1);
}

#[test]
fn weak_candidates_are_not_roamed_to() {
    let mut rig = Rig::two_aps();
    rig.station.reports.clear();
    rig.station.reports.push_back(Ok(report(vec![
        entry(1, 2437, -80, NET),
        entry(2, 5180, -90, NET),
    ])));
    let mut roaming = RoamingLoop::seeded(config(1, 2), 7);

    let it = roaming.iterate(&mut rig.ports());

    assert_eq!(it.skipped, Some(SkipReason::NoneAboveFloor));
    assert_eq!(rig.station.count("roam"), 0);
    assert_eq!(roaming.stats().roams_skipped, 1);
}

#[test]
fn empty_scans_fail_the_phase_but_not_the_iteration() {
    let mut rig = Rig::two_aps();
    rig.station.reports.clear();
    let mut roaming = RoamingLoop::seeded(config(1, 2), 7);

    let it = roaming.iterate(&mut rig.ports());

    assert_eq!(it.scan_error, Some(ScanError::NoCandidates { attempts: 3 }));
    assert!(it.address.as_ref().is_some_and(AddressOutcome::acquired));
    assert_eq!(rig.station.count("scan_results"), 3);
    assert_eq!(
        rig.pause.pauses.borrow()[..5],
        [
            Duration::from_secs(8),
            Duration::from_secs(3),
            Duration::from_secs(8),
            Duration::from_secs(3),
            Duration::from_secs(8),
        ]
    );
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        RoamEvent::PhaseFailed {
            phase: Phase::Scan,
            ..
        }
    )));
    assert_eq!(roaming.stats().scan_failures, 1);
}

#[test]
fn failed_roam_keeps_the_verified_belief() {
    let mut rig = Rig::two_aps();
    rig.station.roam_behavior = RoamBehavior::Reject;
    rig.station.select_ok = false;
    let mut roaming = RoamingLoop::seeded(config(1, 2), 7);

    let it = roaming.iterate(&mut rig.ports());

    assert!(matches!(
        it.roam.map(|r| r.outcome),
        Some(RoamOutcome::Failed(_))
    ));
    assert_eq!(roaming.session().current_bssid(), Some(bssid(1)));
    assert!(it.address.is_some());
    assert_eq!(roaming.stats().roams_failed, 1);
}

#[test]
fn out_of_band_association_change_is_counted() {
    let mut rig = Rig::two_aps();
    let mut roaming = RoamingLoop::seeded(config(1, 2), 7);
    roaming.iterate(&mut rig.ports());

    rig.station.associated = Some(bssid(9));
    rig.sink.events.clear();
    roaming.iterate(&mut rig.ports());

    assert!(matches!(
        rig.sink.events.first(),
        Some(RoamEvent::Association { changed: true, bssid: Some(b), .. }) if *b == bssid(9)
    ));
    assert_eq!(roaming.stats().external_changes, 1);
}

#[test]
fn run_waits_a_whole_number_of_minutes_in_the_window() {
    let mut rig = Rig::two_aps();
    // Iteration 1 pauses once (scan settle); the second pause is the wait.
    rig.pause = InstantPause::stopping_after(2);
    let mut roaming = RoamingLoop::seeded(config(2, 5), 42);

    let stats = roaming.run(&mut rig.ports(), false);

    assert_eq!(stats.iterations, 1);
    let pauses = rig.pause.pauses.borrow();
    assert_eq!(pauses.len(), 2);
    let wait = pauses[1];
    assert!(wait >= Duration::from_secs(120) && wait <= Duration::from_secs(300));
    assert_eq!(wait.as_secs() % 60, 0);
}

#[test]
fn run_once_does_not_wait() {
    let mut rig = Rig::two_aps();
    let mut roaming = RoamingLoop::seeded(config(2, 5), 42);

    let stats = roaming.run(&mut rig.ports(), true);

    assert_eq!(stats.iterations, 1);
    assert!(rig.pause.pauses.borrow().iter().all(|p| *p < Duration::from_secs(60)));
}

#[test]
fn run_after_shutdown_does_nothing() {
    let mut rig = Rig::two_aps();
    rig.pause = InstantPause::stopping_after(1);
    assert!(!roamd::app::ports::Pause::pause(&rig.pause, Duration::ZERO));
    let mut roaming = RoamingLoop::seeded(config(2, 5), 42);

    let stats = roaming.run(&mut rig.ports(), false);

    assert_eq!(stats.iterations, 0);
    assert!(rig.station.calls.is_empty());
}

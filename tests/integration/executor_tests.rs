//! Roam executor against the mock station: command paths, the
//! verification chain and idempotence.

use std::time::Duration;

use roamd::app::executor::RoamExecutor;
use roamd::app::verify::VerifyMethod;
use roamd::error::RoamError;
use roamd::fsm::StateId;
use roamd::fsm::context::{CommandPath, RoamOutcome, RoamRequest, VerifySettings};

use crate::mock_station::{InstantPause, MockStation, NET, RoamBehavior, Visibility, bssid};

fn executor() -> RoamExecutor {
    RoamExecutor::new(VerifySettings {
        attempts: 10,
        interval: Duration::from_secs(1),
    })
}

fn request(target: u8, cached: Option<u8>) -> RoamRequest {
    RoamRequest {
        target: bssid(target),
        ssid: NET.to_owned(),
        cached: cached.map(bssid),
    }
}

#[test]
fn roam_is_verified_on_first_probe() {
    let mut station = MockStation::new().on(bssid(1));
    let pause = InstantPause::new();

    let report = executor().execute(&mut station, &pause, request(2, Some(1)));

    assert_eq!(report.outcome, RoamOutcome::Connected(bssid(2)));
    assert_eq!(report.command, Some(CommandPath::Roam));
    assert_eq!(report.probes, 1);
    assert_eq!(
        report.path,
        vec![
            StateId::Idle,
            StateId::Roaming,
            StateId::Verifying,
            StateId::Connected
        ]
    );
    assert!(pause.pauses.borrow().is_empty());
}

#[test]
fn already_on_target_never_roams() {
    // Cached belief matches.
    let mut station = MockStation::new().on(bssid(3));
    let report = executor().execute(&mut station, &InstantPause::new(), request(3, Some(3)));
    assert_eq!(report.outcome, RoamOutcome::AlreadyConnected(bssid(3)));
    assert_eq!(station.count("roam"), 0);

    // Stale cache, but a fresh query shows we are already there.
    let mut station = MockStation::new().on(bssid(3));
    let report = executor().execute(&mut station, &InstantPause::new(), request(3, Some(9)));
    assert_eq!(report.outcome, RoamOutcome::AlreadyConnected(bssid(3)));
    assert_eq!(station.count("roam"), 0);
    assert_eq!(report.path, vec![StateId::Idle, StateId::Connected]);
}

#[test]
fn timed_out_roam_falls_back_to_pinned_network() {
    let mut station = MockStation::new().on(bssid(1));
    station.roam_behavior = RoamBehavior::TimeOut;
    station.networks.push(roamd::app::ports::ConfiguredNetwork {
        id: 4,
        ssid: "Net".into(),
        bssid: Some(bssid(2)),
        flags: String::new(),
    });

    let report = executor().execute(&mut station, &InstantPause::new(), request(2, Some(1)));

    assert_eq!(report.command, Some(CommandPath::SelectNetwork(4)));
    assert_eq!(report.outcome, RoamOutcome::Connected(bssid(2)));
    assert_eq!(station.count("select_network"), 1);
}

#[test]
fn alternate_path_uses_ssid_when_nothing_is_pinned() {
    let mut station = MockStation::new().on(bssid(1));
    station.roam_behavior = RoamBehavior::Reject;

    let report = executor().execute(&mut station, &InstantPause::new(), request(2, Some(1)));

    // The supplicant stays on its own choice: a degraded but connected roam.
    assert_eq!(report.command, Some(CommandPath::SelectNetwork(0)));
    assert_eq!(
        report.outcome,
        RoamOutcome::Degraded {
            target: bssid(2),
            actual: bssid(1)
        }
    );
}

#[test]
fn both_command_paths_failing_is_command_failure() {
    let mut station = MockStation::new().on(bssid(1));
    station.roam_behavior = RoamBehavior::Reject;
    station.select_ok = false;

    let report = executor().execute(&mut station, &InstantPause::new(), request(2, Some(1)));

    assert!(matches!(
        report.outcome,
        RoamOutcome::Failed(RoamError::CommandFailed { target, .. }) if target == bssid(2)
    ));
    assert_eq!(report.path.last(), Some(&StateId::Failed));
    assert_eq!(report.probes, 0);
}

#[test]
fn link_query_confirms_when_status_is_blind() {
    let mut station = MockStation::new().on(bssid(1));
    station.visibility = Visibility {
        status: false,
        link: true,
        legacy: true,
    };

    let report = executor().execute(&mut station, &InstantPause::new(), request(2, None));

    assert_eq!(report.outcome, RoamOutcome::Connected(bssid(2)));
    assert!(station.count("link") >= 1);
    assert_eq!(station.count("legacy"), 0);
}

#[test]
fn legacy_query_is_the_last_resort() {
    let mut station = MockStation::new().on(bssid(1));
    station.visibility = Visibility {
        status: false,
        link: false,
        legacy: true,
    };
    assert_eq!(
        roamd::app::verify::current_association(&mut station),
        Some((bssid(1), VerifyMethod::LegacyLinkInfo))
    );
}

#[test]
fn landing_elsewhere_is_degraded_after_full_window() {
    let mut station = MockStation::new().on(bssid(1));
    station.roam_behavior = RoamBehavior::LandOn(bssid(5));
    let pause = InstantPause::new();

    let report = executor().execute(&mut station, &pause, request(2, Some(1)));

    assert_eq!(
        report.outcome,
        RoamOutcome::Degraded {
            target: bssid(2),
            actual: bssid(5)
        }
    );
    assert_eq!(report.outcome.verified_bssid(), Some(bssid(5)));
    assert_eq!(report.probes, 10);
    assert_eq!(pause.pauses.borrow().len(), 9);
}

#[test]
fn landing_on_another_network_is_not_degraded() {
    // The supplicant fell over to a different configured network.
    let mut station = MockStation::new().on(bssid(1));
    station.roam_behavior = RoamBehavior::LandOn(bssid(7));
    station.ssid = "CoffeeShop".to_owned();
    let pause = InstantPause::new();

    let report = executor().execute(&mut station, &pause, request(2, Some(1)));

    assert_eq!(
        report.outcome,
        RoamOutcome::Failed(RoamError::Unverified {
            target: bssid(2),
            probes: 10
        })
    );
    assert_eq!(report.outcome.verified_bssid(), None);
}

#[test]
fn other_ap_seen_only_by_link_tools_is_not_degraded() {
    let mut station = MockStation::new().on(bssid(1));
    station.roam_behavior = RoamBehavior::LandOn(bssid(5));
    station.visibility = Visibility {
        status: false,
        link: true,
        legacy: true,
    };

    let report = executor().execute(&mut station, &InstantPause::new(), request(2, Some(1)));

    assert!(matches!(
        report.outcome,
        RoamOutcome::Failed(RoamError::Unverified { .. })
    ));
}

#[test]
fn no_association_is_unverified() {
    let mut station = MockStation::new().on(bssid(1));
    station.roam_behavior = RoamBehavior::Vanish;
    let pause = InstantPause::new();

    let report = executor().execute(&mut station, &pause, request(2, Some(1)));

    assert_eq!(
        report.outcome,
        RoamOutcome::Failed(RoamError::Unverified {
            target: bssid(2),
            probes: 10
        })
    );
    assert_eq!(report.outcome.verified_bssid(), None);
    assert_eq!(pause.total(), Duration::from_secs(9));
}

#[test]
fn shutdown_cuts_verification_short() {
    let mut station = MockStation::new().on(bssid(1));
    station.roam_behavior = RoamBehavior::Vanish;
    let pause = InstantPause::stopping_after(2);

    let report = executor().execute(&mut station, &pause, request(2, Some(1)));

    assert_eq!(
        report.outcome,
        RoamOutcome::Failed(RoamError::Interrupted { target: bssid(2) })
    );
    assert_eq!(report.probes, 2);
}

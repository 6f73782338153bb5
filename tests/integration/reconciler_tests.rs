//! Connectivity reconciler against shared mock network/lease state.

use std::net::Ipv4Addr;
use std::time::Duration;

use roamd::app::reconciler::{AddressOutcome, ReconcileSettings, Reconciler};
use roamd::error::AddressError;

use crate::mock_station::{InstantPause, MockLease, MockNet, healthy_world};

fn reconciler() -> Reconciler {
    Reconciler::new(ReconcileSettings {
        release_pause: Duration::from_secs(1),
        poll_interval: Duration::from_secs(1),
        poll_attempts: 10,
    })
}

const ADDR: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 5);

#[test]
fn healthy_address_is_left_alone() {
    let world = healthy_world();
    let mut net = MockNet::new(world.clone());
    let mut lease = MockLease::new(world.clone());

    let out = reconciler().ensure_address(&mut net, &mut lease, &InstantPause::new(), false);

    assert_eq!(out, AddressOutcome::Healthy { address: ADDR });
    assert_eq!(world.borrow().calls, vec!["ping 10.0.0.1"]);
}

#[test]
fn unreachable_gateway_runs_the_whole_chain() {
    // An address is bound but the gateway is silent: the liveness check
    // must fail and the chain must run even without force_renew.  Every
    // strategy hands back the same address, so none of them stops it.
    let world = healthy_world();
    world.borrow_mut().gateway_up = false;
    let mut net = MockNet::new(world.clone());
    net.link_cycle_heals = true;
    let mut lease = MockLease::new(world.clone());

    let out = reconciler().ensure_address(&mut net, &mut lease, &InstantPause::new(), false);

    let calls = world.borrow().calls.clone();
    assert!(calls.contains(&"daemon renew".to_owned()));
    assert!(calls.contains(&"oneshot request".to_owned()));
    assert!(calls.contains(&"link up".to_owned()));
    assert_eq!(
        out,
        AddressOutcome::Partial {
            address: ADDR,
            strategy: "link-cycle"
        }
    );
    assert!(out.acquired());
}

#[test]
fn stale_address_moves_on_until_the_gateway_answers() {
    let world = healthy_world();
    {
        let mut w = world.borrow_mut();
        w.gateway_up = false;
        w.gateway_heals_on = Some("oneshot");
    }
    let mut net = MockNet::new(world.clone());
    let mut lease = MockLease::new(world.clone());

    let out = reconciler().ensure_address(&mut net, &mut lease, &InstantPause::new(), false);

    assert_eq!(
        out,
        AddressOutcome::Acquired {
            address: ADDR,
            strategy: "oneshot"
        }
    );
    assert!(!world.borrow().calls.contains(&"link down".to_owned()));
}

#[test]
fn new_address_without_gateway_is_partial() {
    let fresh = Ipv4Addr::new(10, 0, 0, 9);
    let world = healthy_world();
    {
        let mut w = world.borrow_mut();
        w.gateway_up = false;
        w.lease = Some(fresh);
    }
    let mut net = MockNet::new(world.clone());
    let mut lease = MockLease::new(world.clone());

    let out = reconciler().ensure_address(&mut net, &mut lease, &InstantPause::new(), false);

    assert_eq!(
        out,
        AddressOutcome::Partial {
            address: fresh,
            strategy: "daemon-renew"
        }
    );
    assert!(!world.borrow().calls.contains(&"oneshot request".to_owned()));
}

#[test]
fn forced_renewal_runs_even_when_healthy() {
    let world = healthy_world();
    let mut net = MockNet::new(world.clone());
    let mut lease = MockLease::new(world.clone());

    let out = reconciler().ensure_address(&mut net, &mut lease, &InstantPause::new(), true);

    assert_eq!(
        out,
        AddressOutcome::Acquired {
            address: ADDR,
            strategy: "daemon-renew"
        }
    );
}

#[test]
fn stopped_daemon_is_started() {
    let world = healthy_world();
    world.borrow_mut().address = None;
    let mut net = MockNet::new(world.clone());
    let mut lease = MockLease::new(world.clone());
    lease.daemon_running = false;

    let out = reconciler().ensure_address(&mut net, &mut lease, &InstantPause::new(), false);

    assert_eq!(
        out,
        AddressOutcome::Acquired {
            address: ADDR,
            strategy: "daemon-start"
        }
    );
    assert!(!world.borrow().calls.contains(&"daemon renew".to_owned()));
}

#[test]
fn read_only_state_dir_falls_back_to_oneshot() {
    let world = healthy_world();
    world.borrow_mut().address = None;
    let mut net = MockNet::new(world.clone());
    let mut lease = MockLease::new(world.clone());
    lease.daemon_running = false;
    lease.state_dir_writable = false;
    let pause = InstantPause::new();

    let out = reconciler().ensure_address(&mut net, &mut lease, &pause, false);

    assert_eq!(
        out,
        AddressOutcome::Acquired {
            address: ADDR,
            strategy: "oneshot"
        }
    );
    assert_eq!(world.borrow().calls[0], "oneshot release");
    // Release pause only; the address showed up on the first poll.
    assert_eq!(*pause.pauses.borrow(), vec![Duration::from_secs(1)]);
}

#[test]
fn link_cycle_is_the_last_resort() {
    let world = healthy_world();
    world.borrow_mut().address = None;
    let mut net = MockNet::new(world.clone());
    net.link_cycle_heals = true;
    let mut lease = MockLease::new(world.clone());
    lease.grants.clear();

    let out = reconciler().ensure_address(&mut net, &mut lease, &InstantPause::new(), false);

    assert_eq!(
        out,
        AddressOutcome::Acquired {
            address: ADDR,
            strategy: "link-cycle"
        }
    );
    let calls = world.borrow().calls.clone();
    let down = calls.iter().position(|c| c == "link down").unwrap();
    let up = calls.iter().position(|c| c == "link up").unwrap();
    assert!(down < up);
}

#[test]
fn exhausted_chain_reports_what_was_tried() {
    let world = healthy_world();
    world.borrow_mut().address = None;
    let mut net = MockNet::new(world.clone());
    let mut lease = MockLease::new(world.clone());
    lease.grants.clear();
    lease.oneshot_installed = false;
    let pause = InstantPause::new();

    let out = reconciler().ensure_address(&mut net, &mut lease, &pause, false);

    assert_eq!(
        out,
        AddressOutcome::Failed {
            tried: vec!["daemon-renew", "link-cycle"]
        }
    );
    assert_eq!(
        out.error(),
        Some(AddressError::Exhausted {
            tried: vec!["daemon-renew", "link-cycle"]
        })
    );
    // Link cycle pause plus a full poll window (10 probes, 9 gaps).
    assert_eq!(pause.total(), Duration::from_secs(1 + 9));
}

#[test]
fn shutdown_during_poll_interrupts() {
    let world = healthy_world();
    world.borrow_mut().address = None;
    let mut net = MockNet::new(world.clone());
    let mut lease = MockLease::new(world.clone());
    lease.grants.clear();
    let pause = InstantPause::stopping_after(1);

    let out = reconciler().ensure_address(&mut net, &mut lease, &pause, false);

    assert_eq!(out, AddressOutcome::Interrupted);
    assert_eq!(out.error(), Some(AddressError::Interrupted));
}

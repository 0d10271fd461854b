//! Integration tests for start/dock/pause: reconnect, send, induced refresh.

use futures_lite::future::{self, block_on};

use mowerlink::NormalizedActivity;
use mowerlink::app::commands::MowerCommand;
use mowerlink::app::snapshot::Snapshot;
use mowerlink::error::{ConnectFailure, DriverError, Error};

use crate::mock_mower::{DriverCall, FULL_CYCLE, MockMower, Recorder, coordinator};

fn after_command(calls: &[DriverCall], sent: &[DriverCall]) {
    assert_eq!(&calls[..sent.len()], sent);
    assert_eq!(&calls[sent.len()..], &FULL_CYCLE);
}

#[test]
fn start_from_dock_sends_resume_then_override() {
    let coord = coordinator(MockMower::new());
    block_on(coord.refresh()).unwrap();
    assert_eq!(coord.last_known_activity(), Some(NormalizedActivity::Docked));
    coord.session().clear_calls();

    coord
        .session()
        .set_codes("MowerState.IN_OPERATION", "MowerActivity.GOING_OUT");
    let snap = block_on(coord.start()).unwrap();

    after_command(
        &coord.session().calls(),
        &[DriverCall::Resume, DriverCall::Override],
    );
    assert_eq!(snap.normalized(), NormalizedActivity::Mowing);
    assert_eq!(snap.revision, 2);
}

#[test]
fn start_while_paused_sends_resume_only() {
    let mower = MockMower::new();
    mower.set_codes("MowerState.PAUSED", "MowerActivity.MOWING");
    let coord = coordinator(mower);
    block_on(coord.refresh()).unwrap();
    assert_eq!(coord.last_known_activity(), Some(NormalizedActivity::Paused));
    coord.session().clear_calls();

    block_on(coord.start()).unwrap();
    after_command(&coord.session().calls(), &[DriverCall::Resume]);
}

#[test]
fn start_without_a_snapshot_sends_resume_only() {
    let coord = coordinator(MockMower::new());
    block_on(coord.start()).unwrap();
    after_command(&coord.session().calls(), &[DriverCall::Resume]);
}

#[test]
fn dock_and_pause_map_to_park_and_pause() {
    let coord = coordinator(MockMower::new());

    block_on(coord.dock()).unwrap();
    after_command(&coord.session().calls(), &[DriverCall::Park]);

    coord.session().clear_calls();
    block_on(coord.execute(MowerCommand::Pause)).unwrap();
    after_command(&coord.session().calls(), &[DriverCall::Pause]);
}

#[test]
fn command_refresh_reaches_subscribers() {
    let coord = coordinator(MockMower::new());
    let events = Recorder::default();
    coord.subscribe(events.sink());

    coord
        .session()
        .set_codes("MowerState.PAUSED", "MowerActivity.MOWING");
    block_on(coord.pause()).unwrap();

    let seen = events.events();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].snapshot().map(Snapshot::normalized),
        Some(NormalizedActivity::Paused)
    );
}

#[test]
fn command_reconnects_once_before_sending() {
    let coord = coordinator(MockMower::disconnected());

    block_on(coord.start()).unwrap();
    let calls = coord.session().calls();
    assert_eq!(calls[0], DriverCall::Connect);
    after_command(&calls[1..], &[DriverCall::Resume]);
    assert_eq!(coord.session().count(DriverCall::Connect), 1);
}

#[test]
fn command_with_unreachable_mower_sends_nothing() {
    let mower = MockMower::disconnected();
    mower.refuse_connect();
    let coord = coordinator(mower);
    let events = Recorder::default();
    coord.subscribe(events.sink());

    let err = block_on(coord.start()).unwrap_err();
    assert_eq!(err, Error::Connection(ConnectFailure::Refused));
    assert_eq!(coord.session().calls(), [DriverCall::Connect]);
    assert_eq!(events.len(), 0);
}

#[test]
fn rejected_command_skips_refresh() {
    let coord = coordinator(MockMower::new());
    coord.session().fail_commands();

    let err = block_on(coord.dock()).unwrap_err();
    assert!(matches!(
        err,
        Error::Command {
            command: MowerCommand::Dock,
            cause: DriverError::Gatt(_)
        }
    ));
    assert_eq!(coord.session().calls(), [DriverCall::Park]);
    assert!(coord.snapshot().is_none());
}

#[test]
fn command_after_shutdown_is_refused() {
    let coord = coordinator(MockMower::new());
    block_on(coord.shutdown());
    coord.session().clear_calls();

    assert_eq!(block_on(coord.start()), Err(Error::ShutdownInProgress));
    assert!(coord.session().calls().is_empty());
}

#[test]
fn command_queues_behind_a_running_poll() {
    let coord = coordinator(MockMower::new());

    let (polled, commanded) = block_on(future::zip(coord.refresh(), coord.pause()));
    assert_eq!(polled.unwrap().revision, 1);
    assert_eq!(commanded.unwrap().revision, 2);

    // The poll's reads complete before the command is sent.
    let calls = coord.session().calls();
    assert_eq!(&calls[..4], &FULL_CYCLE);
    after_command(&calls[4..], &[DriverCall::Pause]);
}

//! Polling coordinator: owns the BLE session and the poll loop.
//!
//! [`PollingCoordinator`] keeps exactly one current [`Snapshot`], refreshes
//! it on a fixed schedule and on demand, and forwards mower commands.
//! Everything that touches the driver runs under one async mutex (the
//! *link lock*), so scheduled polls, on-demand refreshes, commands and
//! the shutdown disconnect are totally ordered.
//!
//! ```text
//!  PollSchedule ─┐
//!  refresh()  ───┼──▶ link lock ──▶ reconnect? ──▶ reads ──▶ install ──▶ EventSinks
//!  execute()  ───┤                 (once)         (in order)  snapshot
//!  shutdown() ───┘
//! ```
//!
//! The coordinator is single-threaded: run it on one local executor per
//! mower.  Independent mowers share nothing.

use core::cell::{Cell, RefCell};
use core::future::Future;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, with_timeout};
use log::{debug, info, warn};

use crate::config::MowerConfig;
use crate::error::{ConfigError, ConnectFailure, DriverError, Error, Field, Result};
use crate::resolver::{ActivityCode, NormalizedActivity, StateCode};
use crate::scheduler::PollSchedule;
use crate::view::{MowerIdentity, MowerView};

use super::commands::MowerCommand;
use super::events::MowerEvent;
use super::ports::{EventSink, MowerSession, TransportResolver};
use super::snapshot::{self, Snapshot};

// ───────────────────────────────────────────────────────────────
// Subscriptions
// ───────────────────────────────────────────────────────────────

/// Handle returned by [`PollingCoordinator::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The sink slot is empty while that sink's `emit` is running.
type Subscriber = (SubscriptionId, Option<Box<dyn EventSink>>);

// ───────────────────────────────────────────────────────────────
// PollingCoordinator
// ───────────────────────────────────────────────────────────────

/// Coordinates polling, reconnects and commands for one mower.
pub struct PollingCoordinator<S, R> {
    identity: MowerIdentity,
    session: S,
    resolver: R,
    io_timeout: Option<Duration>,
    read_next_start_time: bool,
    schedule: PollSchedule,

    /// Held for the whole of every driver interaction.
    link: Mutex<NoopRawMutex, ()>,
    /// Completed poll cycles (successful or not).
    cycles: Cell<u64>,
    shut_down: Cell<bool>,

    current: RefCell<Option<Snapshot>>,
    last_outcome: RefCell<Option<Result<Snapshot>>>,
    revision: Cell<u64>,

    subscribers: RefCell<Vec<Subscriber>>,
    next_subscription: Cell<u64>,
}

impl<S, R> PollingCoordinator<S, R>
where
    S: MowerSession,
    R: TransportResolver<S::Handle>,
{
    /// Build a coordinator.  Does not connect; the first refresh does.
    pub fn new(
        config: MowerConfig,
        session: S,
        resolver: R,
    ) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "Coordinator for {} (model {}) polling every {}s",
            config.address, config.model, config.poll_interval_secs
        );

        Ok(Self {
            identity: MowerIdentity::new(config.address.clone(), config.model.clone()),
            session,
            resolver,
            io_timeout: config.io_timeout(),
            read_next_start_time: config.read_next_start_time,
            schedule: PollSchedule::new(config.poll_interval()),
            link: Mutex::new(()),
            cycles: Cell::new(0),
            shut_down: Cell::new(false),
            current: RefCell::new(None),
            last_outcome: RefCell::new(None),
            revision: Cell::new(0),
            subscribers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the periodic refresh until [`shutdown`](Self::shutdown).
    ///
    /// Polls once immediately.  Failures are reported to subscribers and
    /// never end the loop.
    pub async fn run(&self) {
        self.schedule
            .run(move || async move {
                // Outcome already delivered to subscribers.
                let _ = self.refresh().await;
            })
            .await;
        info!("Coordinator for {} stopped", self.identity.address);
    }

    /// Stop polling and release the link.
    ///
    /// Cancels the schedule, waits for an in-flight cycle, then disconnects
    /// if (and only if) the session is connected.  Idempotent.
    pub async fn shutdown(&self) {
        if self.shut_down.replace(true) {
            debug!("Shutdown: already shut down");
            return;
        }
        info!("Shutdown: {}", self.identity.address);
        self.schedule.cancel();

        let _link = self.link.lock().await;
        if self.session.is_connected() {
            info!("Disconnecting from {}", self.identity.address);
            if let Err(e) = self.session.disconnect().await {
                warn!("Disconnect from {} failed: {}", self.identity.address, e);
            }
        }
    }

    // ── Polling ───────────────────────────────────────────────

    /// Poll the mower now.
    ///
    /// A refresh requested while another cycle holds the link waits for it
    /// and returns that cycle's outcome instead of issuing its own reads.
    pub async fn refresh(&self) -> Result<Snapshot> {
        if self.shut_down.get() {
            return Err(Error::ShutdownInProgress);
        }

        let _link = if let Ok(guard) = self.link.try_lock() {
            guard
        } else {
            let seen = self.cycles.get();
            debug!("Refresh: cycle in flight, waiting for it");
            let guard = self.link.lock().await;
            if self.cycles.get() != seen {
                if let Some(outcome) = self.last_outcome.borrow().clone() {
                    return outcome;
                }
            }
            guard
        };

        if self.shut_down.get() {
            return Err(Error::ShutdownInProgress);
        }
        self.poll_cycle().await
    }

    /// Caller must hold the link lock.
    async fn poll_cycle(&self) -> Result<Snapshot> {
        let outcome = match self.ensure_connected().await {
            Ok(()) => self.read_snapshot().await,
            Err(e) => Err(e),
        };
        self.cycles.set(self.cycles.get() + 1);

        let event = match &outcome {
            Ok(snap) => {
                self.revision.set(snap.revision);
                *self.current.borrow_mut() = Some(snap.clone());
                debug!(
                    "Snapshot r{}: battery={:?} state={} activity={} -> {}",
                    snap.revision,
                    snap.battery_level,
                    snap.state,
                    snap.activity,
                    snap.normalized()
                );
                MowerEvent::Snapshot(snap.clone())
            }
            Err(e) => {
                warn!("Poll of {} failed: {}", self.identity.address, e);
                MowerEvent::Failure(e.clone())
            }
        };
        *self.last_outcome.borrow_mut() = Some(outcome.clone());
        self.notify(&event);
        outcome
    }

    async fn read_snapshot(&self) -> Result<Snapshot> {
        debug!("Polling {}", self.identity.address);

        let battery = self
            .read(Field::BatteryLevel, self.session.read_battery_level())
            .await?;
        debug!("battery_level = {battery}");
        let activity = self.read(Field::Activity, self.session.read_activity()).await?;
        debug!("activity = {activity}");
        let state = self.read(Field::State, self.session.read_state()).await?;
        debug!("state = {state}");

        let next_start_time = if self.read_next_start_time {
            match self
                .read(Field::NextStartTime, self.session.read_next_start_time())
                .await
            {
                Ok(raw) => snapshot::or_absent(
                    snapshot::parse_next_start_time(raw.as_deref().unwrap_or_default()),
                ),
                Err(e) => {
                    warn!("Optional read failed, keeping cycle: {e}");
                    None
                }
            }
        } else {
            None
        };

        Ok(Snapshot {
            revision: self.revision.get() + 1,
            battery_level: snapshot::or_absent(snapshot::parse_battery_level(battery).map(Some)),
            activity: ActivityCode::new(activity),
            state: StateCode::new(state),
            next_start_time,
        })
    }

    // ── Commands ──────────────────────────────────────────────

    /// Send a command, then refresh so subscribers see its effect.
    ///
    /// Reconnects once if the link is down; if that fails no command is
    /// sent.  Returns the outcome of the induced refresh.
    pub async fn execute(&self, command: MowerCommand) -> Result<Snapshot> {
        if self.shut_down.get() {
            return Err(Error::ShutdownInProgress);
        }
        let _link = self.link.lock().await;
        if self.shut_down.get() {
            return Err(Error::ShutdownInProgress);
        }

        if let Err(e) = self.ensure_connected().await {
            warn!("Command {command} dropped: {e}");
            return Err(e);
        }

        info!("Command {} -> {}", command, self.identity.address);
        self.send(command).await.map_err(|cause| {
            warn!("Command {command} failed: {cause}");
            Error::Command { command, cause }
        })?;

        self.poll_cycle().await
    }

    pub async fn start(&self) -> Result<Snapshot> {
        self.execute(MowerCommand::Start).await
    }

    pub async fn dock(&self) -> Result<Snapshot> {
        self.execute(MowerCommand::Dock).await
    }

    pub async fn pause(&self) -> Result<Snapshot> {
        self.execute(MowerCommand::Pause).await
    }

    /// Caller must hold the link lock.
    async fn send(&self, command: MowerCommand) -> core::result::Result<(), DriverError> {
        match command {
            MowerCommand::Start => {
                let docked = self.last_known_activity() == Some(NormalizedActivity::Docked);
                self.guarded(self.session.command_resume()).await?;
                if docked {
                    debug!("Mower docked, sending override");
                    self.guarded(self.session.command_override()).await?;
                }
                Ok(())
            }
            MowerCommand::Dock => self.guarded(self.session.command_park()).await,
            MowerCommand::Pause => self.guarded(self.session.command_pause()).await,
        }
    }

    // ── Link management ───────────────────────────────────────

    /// Reconnect once if the session is down.  Caller must hold the link lock.
    async fn ensure_connected(&self) -> Result<()> {
        if self.session.is_connected() {
            return Ok(());
        }

        let address = &self.identity.address;
        let Some(handle) = self.resolver.resolve(address) else {
            warn!("Reconnect: no connectable device for {address}");
            return Err(ConnectFailure::DeviceNotFound.into());
        };

        info!("Reconnecting to {address}");
        let connected = match self.io_timeout {
            Some(limit) => with_timeout(limit, self.session.connect(handle))
                .await
                .map_err(|_| ConnectFailure::Timeout)?,
            None => self.session.connect(handle).await,
        };

        if connected {
            info!("Connected to {address}");
            Ok(())
        } else {
            Err(ConnectFailure::Refused.into())
        }
    }

    async fn read<T>(
        &self,
        field: Field,
        op: impl Future<Output = core::result::Result<T, DriverError>>,
    ) -> Result<T> {
        self.guarded(op)
            .await
            .map_err(|cause| Error::Read { field, cause })
    }

    /// Apply the configured I/O timeout to a driver call.
    async fn guarded<T>(
        &self,
        op: impl Future<Output = core::result::Result<T, DriverError>>,
    ) -> core::result::Result<T, DriverError> {
        match self.io_timeout {
            Some(limit) => with_timeout(limit, op)
                .await
                .unwrap_or(Err(DriverError::Timeout)),
            None => op.await,
        }
    }

    // ── Subscriptions ─────────────────────────────────────────

    /// Register a sink for every future [`MowerEvent`].
    pub fn subscribe(&self, sink: impl EventSink + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Some(Box::new(sink))));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        subs.len() != before
    }

    fn notify(&self, event: &MowerEvent) {
        // No borrow is held across `emit`: sinks may subscribe or
        // unsubscribe from inside it.  New subscribers start with the
        // next event; removed ones get nothing further.
        let ids: Vec<SubscriptionId> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(id, _)| *id)
            .collect();
        for id in ids {
            let taken = self
                .subscribers
                .borrow_mut()
                .iter_mut()
                .find(|(sid, _)| *sid == id)
                .and_then(|(_, slot)| slot.take());
            let Some(mut sink) = taken else {
                continue;
            };

            sink.emit(event);

            if let Some((_, slot)) = self
                .subscribers
                .borrow_mut()
                .iter_mut()
                .find(|(sid, _)| *sid == id)
            {
                *slot = Some(sink);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// True iff the session reports connected right now.
    pub fn is_available(&self) -> bool {
        self.session.is_connected()
    }

    /// Whether the most recent cycle succeeded.  `false` before the first.
    pub fn last_update_success(&self) -> bool {
        matches!(*self.last_outcome.borrow(), Some(Ok(_)))
    }

    /// Clone of the current snapshot.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.current.borrow().clone()
    }

    /// Normalized activity of the current snapshot.
    pub fn last_known_activity(&self) -> Option<NormalizedActivity> {
        self.current.borrow().as_ref().map(Snapshot::normalized)
    }

    /// Derived consumer values, evaluated now.
    pub fn view(&self) -> MowerView {
        MowerView::derive(
            self.current.borrow().as_ref(),
            self.is_available() && self.last_update_success(),
        )
    }

    pub fn identity(&self) -> &MowerIdentity {
        &self.identity
    }

    pub fn poll_interval(&self) -> Duration {
        self.schedule.period()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.get()
    }

    /// The driver session, for host-side inspection.
    pub fn session(&self) -> &S {
        &self.session
    }
}

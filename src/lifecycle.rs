//! Activation, deactivation and the event loop.
//!
//! The [`Controller`] is the only entry point an embedding process needs.
//! It owns the [`Desktop`], every host subscription and the
//! [`SyncEngine`], and guarantees that [`deactivate`](Controller::deactivate)
//! releases all of them no matter how far [`activate`](Controller::activate)
//! got.
//!
//! Host notifications arrive on an [`mpsc`] channel whose sender is handed
//! to [`Desktop::subscribe`].  The controller drains that channel and drives
//! the engine's clock from a monotonic [`Instant`]; the `*_at` variants take
//! an explicit time instead so tests can run on a virtual clock.

use crate::config::SyncConfig;
use crate::engine::{SyncEngine, SyncError};
use crate::model::{HostEvent, Signal};
use crate::traits::{Desktop, SubscriptionId};
use log::{debug, error, info, warn};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// How long [`run`](Controller::run) waits for an event when no task is
/// scheduled.
const IDLE_WAIT: Duration = Duration::from_secs(1);

/// Signals only needed while the engine is active.
const WORKSPACE_SIGNALS: [Signal; 3] = [
    Signal::ActiveWorkspaceChanged,
    Signal::WorkspaceAdded,
    Signal::WorkspaceRemoved,
];

/// A live host subscription.
#[derive(Debug, Clone, Copy)]
struct Subscription {
    id: SubscriptionId,
    signal: Signal,
}

/// Owns the engine and its host subscriptions.
pub struct Controller<D: Desktop> {
    desktop: D,
    config: SyncConfig,
    engine: Option<SyncEngine>,
    events_tx: mpsc::Sender<HostEvent>,
    events_rx: mpsc::Receiver<HostEvent>,
    /// Monitor notifications, held for as long as the controller is
    /// activated so a second monitor can wake the engine up.
    topology_subs: Vec<Subscription>,
    /// Workspace notifications, held only while the engine is active.
    workspace_subs: Vec<Subscription>,
    epoch: Instant,
}

impl<D: Desktop> Controller<D> {
    pub fn new(desktop: D, config: SyncConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            desktop,
            config,
            engine: None,
            events_tx,
            events_rx,
            topology_subs: Vec::new(),
            workspace_subs: Vec::new(),
            epoch: Instant::now(),
        }
    }

    /// Build the engine, read the initial topology and subscribe to host
    /// notifications.
    ///
    /// On failure everything acquired so far is released again.  Calling
    /// this on an activated controller does nothing.
    pub fn activate(&mut self) -> Result<(), SyncError> {
        self.activate_at(self.elapsed())
    }

    /// [`activate`](Self::activate) with an explicit clock reading.
    pub fn activate_at(&mut self, now: Duration) -> Result<(), SyncError> {
        if self.engine.is_some() {
            debug!("already activated");
            return Ok(());
        }

        let result = self.try_activate(now);
        if let Err(ref e) = result {
            error!("activation failed: {}", e);
            self.deactivate();
        }
        result
    }

    fn try_activate(&mut self, now: Duration) -> Result<(), SyncError> {
        let sub = self.subscribe(Signal::MonitorsChanged)?;
        self.topology_subs.push(sub);

        let mut engine = SyncEngine::new(self.config.clone());
        engine.start(&self.desktop, now)?;
        self.engine = Some(engine);
        self.reconcile_subscriptions()
    }

    /// Stop the engine, cancel every scheduled task and release every host
    /// subscription.
    ///
    /// Safe to call any number of times, including after a failed
    /// [`activate`](Self::activate).
    pub fn deactivate(&mut self) {
        let was_active = self.engine.is_some();
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
        }
        release(&self.desktop, &mut self.workspace_subs);
        release(&self.desktop, &mut self.topology_subs);
        let dropped = self.events_rx.try_iter().count();
        if dropped > 0 {
            debug!("dropped {} undelivered event(s)", dropped);
        }
        if was_active {
            info!("deactivated");
        }
    }

    /// Deliver queued notifications and run every task that is due.
    pub fn pump(&mut self) {
        self.pump_at(self.elapsed());
    }

    /// [`pump`](Self::pump) with an explicit clock reading.
    pub fn pump_at(&mut self, now: Duration) {
        let Some(engine) = self.engine.as_mut() else {
            // Not activated: nothing is listening.
            self.events_rx.try_iter().for_each(drop);
            return;
        };
        engine.advance(&self.desktop, now);
        for event in self.events_rx.try_iter() {
            engine.handle_event(&self.desktop, event);
        }
        engine.advance(&self.desktop, now);
        self.reconcile_or_warn();
    }

    /// Serve notifications and timers until the controller is deactivated.
    ///
    /// Blocks the calling thread, sleeping until the next event or the
    /// next scheduled task.
    pub fn run(&mut self) {
        info!("monsync running");
        while self.engine.is_some() {
            self.pump();
            let timeout = self
                .engine
                .as_ref()
                .and_then(SyncEngine::next_deadline)
                .map(|due| due.saturating_sub(self.elapsed()))
                .unwrap_or(IDLE_WAIT);
            match self.events_rx.recv_timeout(timeout) {
                Ok(event) => self.dispatch_at(event, self.elapsed()),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    fn dispatch_at(&mut self, event: HostEvent, now: Duration) {
        if let Some(engine) = self.engine.as_mut() {
            engine.advance(&self.desktop, now);
            engine.handle_event(&self.desktop, event);
            engine.advance(&self.desktop, now);
        }
        self.reconcile_or_warn();
    }

    pub fn desktop(&self) -> &D {
        &self.desktop
    }

    /// The engine, while activated.
    pub fn engine(&self) -> Option<&SyncEngine> {
        self.engine.as_ref()
    }

    pub fn is_activated(&self) -> bool {
        self.engine.is_some()
    }

    /// Number of host subscriptions currently held.
    pub fn subscription_count(&self) -> usize {
        self.topology_subs.len() + self.workspace_subs.len()
    }

    //  Subscriptions

    fn subscribe(&self, signal: Signal) -> Result<Subscription, SyncError> {
        let id = self
            .desktop
            .subscribe(signal, self.events_tx.clone())
            .map_err(|e| SyncError::Desktop(format!("subscribe to {}: {}", signal, e)))?;
        debug!("subscribed to {} as {}", signal, id);
        Ok(Subscription { id, signal })
    }

    /// Hold workspace subscriptions exactly while the engine is active.
    fn reconcile_subscriptions(&mut self) -> Result<(), SyncError> {
        let active = self.engine.as_ref().is_some_and(SyncEngine::is_active);
        if active && self.workspace_subs.is_empty() {
            for signal in WORKSPACE_SIGNALS {
                match self.subscribe(signal) {
                    Ok(sub) => self.workspace_subs.push(sub),
                    Err(e) => {
                        release(&self.desktop, &mut self.workspace_subs);
                        return Err(e);
                    }
                }
            }
        } else if !active && !self.workspace_subs.is_empty() {
            release(&self.desktop, &mut self.workspace_subs);
        }
        Ok(())
    }

    fn reconcile_or_warn(&mut self) {
        if let Err(e) = self.reconcile_subscriptions() {
            warn!("workspace notifications unavailable, will retry: {}", e);
        }
    }

    fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }
}

impl<D: Desktop> Drop for Controller<D> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Unsubscribe and forget every subscription in `subs`.
fn release<D: Desktop>(desktop: &D, subs: &mut Vec<Subscription>) {
    for sub in subs.drain(..) {
        match desktop.unsubscribe(sub.id) {
            Ok(()) => debug!("unsubscribed from {} ({})", sub.signal, sub.id),
            Err(e) => warn!("failed to unsubscribe from {}: {}", sub.signal, e),
        }
    }
}

//  Tests

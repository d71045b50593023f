//! # Session: hosts operator tasks, event delivery, and graceful teardown.
//!
//! The [`Session`] owns the event bus, a [`SubscriberSet`], a [`TaskTracker`]
//! over every operator task, and the root [`CancellationToken`]. Constructors
//! are methods on `Session`; operators on a [`PowerSeries`](crate::PowerSeries)
//! spawn into the session of their receiver.
//!
//! ## High-level architecture
//! ```text
//! Session::builder(cfg).with_subscribers(subs).build()
//!   - Bus::new(cfg.bus_capacity_clamped())
//!   - SubscriberSet::new(subs, bus)
//!   - listener: Bus.subscribe() ─► AliveTracker::update + SubscriberSet::emit
//!
//! Spawning (every constructor/operator call):
//!   label = "<op>#<id>"
//!   tracker.spawn(
//!       publish OperatorStarted
//!       select! { body            → publish OperatorStopped
//!                 child.cancelled → publish OperatorCancelled }
//!   )
//!
//! Teardown:
//!   join_idle()  : tracker.close() ─► wait ≤ grace ─► Ok | GraceExceeded
//!   shutdown()   : publish ShutdownRequested ─► token.cancel() ─► join with grace
//!                   ├─ Ok        → publish AllStoppedWithin
//!                   └─ Timeout   → publish GraceExceeded (AliveTracker snapshot)
//! ```
//!
//! ## Rules
//! - A task suspends only at demand-channel rendezvous points; cancellation is
//!   observed at those points too.
//! - Cancelling a task drops every channel half it holds, so its consumers see
//!   end-of-stream and its producers see abandonment.
//! - The listener exits when the last `Session` clone is dropped.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::core::{alive::AliveTracker, config::Config};
use crate::error::{RuntimeError, SeriesError};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::SubscriberSet;

/// Shared state behind every [`Session`] clone.
struct Inner {
    cfg: Config,
    bus: Bus,
    alive: Arc<AliveTracker>,
    tracker: TaskTracker,
    token: CancellationToken,
    next_id: AtomicU64,
}

impl Drop for Inner {
    fn drop(&mut self) {
        // stops the listener; no operator task can be alive here since each holds a clone
        self.token.cancel();
    }
}

/// Handle to the runtime that hosts series computations.
///
/// Cheap to clone; all clones share the same bus, tracker and cancellation root.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Creates a session without subscribers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(cfg: Config) -> Self {
        Self::builder(cfg).build()
    }

    /// Returns a builder for a session with subscribers.
    pub fn builder(cfg: Config) -> super::builder::SessionBuilder {
        super::builder::SessionBuilder::new(cfg)
    }

    pub(super) fn new_internal(cfg: Config, bus: Bus, subs: Arc<SubscriberSet>) -> Self {
        let alive = Arc::new(AliveTracker::new());
        let token = CancellationToken::new();
        Self::listener(&bus, Arc::clone(&alive), subs, token.clone());

        Self {
            inner: Arc::new(Inner {
                cfg,
                bus,
                alive,
                tracker: TaskTracker::new(),
                token,
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Subscribes to the bus and forwards events to the tracker and subscriber set.
    fn listener(
        bus: &Bus,
        alive: Arc<AliveTracker>,
        set: Arc<SubscriberSet>,
        token: CancellationToken,
    ) {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    res = rx.recv() => match res {
                        Ok(ev) => {
                            alive.update(&ev).await;
                            if !set.is_empty() {
                                set.emit(&ev);
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = token.cancelled() => break,
                }
            }
        });
    }

    /// The configuration this session was built with.
    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    /// Creates a receiver observing subsequent runtime events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Sorted labels of the operator tasks currently alive (eventually consistent).
    pub async fn live_tasks(&self) -> Vec<String> {
        self.inner.alive.snapshot().await
    }

    /// Number of spawned tasks that have not exited yet.
    pub fn task_count(&self) -> usize {
        self.inner.tracker.len()
    }

    /// Waits until every task spawned so far has exited, without cancelling.
    ///
    /// Tasks stay alive as long as some consumer holds a series they feed, so
    /// drop every handle before calling this.
    ///
    /// # Errors
    /// [`RuntimeError::GraceExceeded`] if tasks are still alive after [`Config::grace`].
    pub async fn join_idle(&self) -> Result<(), RuntimeError> {
        let res = self.wait_with_grace().await;
        if res.is_ok() {
            self.inner
                .bus
                .publish(Event::new(EventKind::AllStoppedWithin));
        }
        res
    }

    /// Cancels every task of this session and waits for them to exit.
    ///
    /// Consumers still holding series observe end-of-stream afterwards; series
    /// created after shutdown are empty.
    ///
    /// # Errors
    /// [`RuntimeError::GraceExceeded`] if tasks are still alive after [`Config::grace`].
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.inner
            .bus
            .publish(Event::new(EventKind::ShutdownRequested));
        self.inner.token.cancel();
        self.join_idle().await
    }

    async fn wait_with_grace(&self) -> Result<(), RuntimeError> {
        let grace = self.inner.cfg.grace;
        let tracker = &self.inner.tracker;

        tracker.close();
        let timed = tokio::time::timeout(grace, tracker.wait()).await;
        tracker.reopen();

        match timed {
            Ok(()) => Ok(()),
            Err(_) => {
                let stuck = self.inner.alive.snapshot().await;
                self.inner.bus.publish(
                    Event::new(EventKind::GraceExceeded).with_reason(stuck.join(",")),
                );
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Allocates a unique task label `"<op>#<id>"`.
    pub(crate) fn label(&self, op: &str) -> Arc<str> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        format!("{op}#{id}").into()
    }

    /// Spawns one operator task under a fresh label.
    pub(crate) fn spawn<F>(&self, op: &str, body: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawn_as(self.label(op), body);
    }

    /// Spawns one operator task under the given label.
    ///
    /// Publishes `OperatorStarted`, then exactly one of `OperatorStopped`
    /// or `OperatorCancelled`.
    pub(crate) fn spawn_as<F>(&self, label: Arc<str>, body: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let bus = self.inner.bus.clone();
        let token = self.inner.token.child_token();

        self.inner.tracker.spawn(async move {
            bus.publish(Event::new(EventKind::OperatorStarted).with_task(Arc::clone(&label)));
            let kind = tokio::select! {
                _ = body => EventKind::OperatorStopped,
                _ = token.cancelled() => EventKind::OperatorCancelled,
            };
            bus.publish(Event::new(kind).with_task(label));
        });
    }

    /// Publishes a `LinkSpawned` event if link tracing is enabled.
    pub(crate) fn trace_link(&self, split: &str, index: u64) {
        if self.inner.cfg.trace_links {
            self.inner.bus.publish(
                Event::new(EventKind::LinkSpawned)
                    .with_task(split)
                    .with_index(index),
            );
        }
    }

    /// Publishes a `FaultRaised` event for a fault originating in `task`.
    pub(crate) fn report_fault(&self, task: &str, index: u64, err: &SeriesError) {
        self.inner.bus.publish(
            Event::new(EventKind::FaultRaised)
                .with_task(task)
                .with_index(index)
                .with_reason(err.to_string()),
        );
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("cfg", &self.inner.cfg)
            .field("tasks", &self.inner.tracker.len())
            .finish()
    }
}

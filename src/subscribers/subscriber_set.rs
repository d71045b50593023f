//! # Fan-out of series events to subscribers.
//!
//! The session listener hands every operator, link and fault event to
//! [`SubscriberSet::emit`]. Each subscriber reads from its own bounded queue, so
//! a slow subscriber never holds up an operator task that publishes.
//!
//! ```text
//! listener ── emit(ev) ──┬──► [queue] ──► worker ──► recorder.on_event()
//!                        └──► [queue] ──► worker ──► log.on_event()
//!                                            └─ panic ─► SubscriberPanicked on the bus
//! ```
//!
//! A subscriber sees events in publication order. Across subscribers there is
//! no ordering. A full or closed queue drops the event for that subscriber only
//! and publishes `SubscriberOverflow`.
//!
//! Panics are caught with `AssertUnwindSafe`: a subscriber that panics while
//! holding a lock may leave that lock poisoned.

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

struct Queue {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Subscribers attached to one session, each behind its own queue and worker.
pub struct SubscriberSet {
    queues: Vec<Queue>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Starts one worker per subscriber.
    ///
    /// Queue size is [`Subscribe::queue_capacity`], at least 1. Panics raised
    /// by a subscriber are reported on `bus` and the worker keeps going.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut queues = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
            queues.push(Queue {
                name: sub.name(),
                tx,
            });
            workers.push(spawn_worker(sub, rx, bus.clone()));
        }
        Self {
            queues,
            workers,
            bus,
        }
    }

    /// Queues a copy of `event` for every subscriber.
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Queues a shared event for every subscriber without copying it.
    ///
    /// An overflow notice that itself overflows is dropped silently.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let notice = event.kind == EventKind::SubscriberOverflow;

        for q in &self.queues {
            let reason = match q.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !notice {
                self.bus.publish(Event::subscriber_overflow(q.name, reason));
            }
        }
    }

    /// True if no subscriber is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Number of attached subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    /// Closes every queue and waits for the workers to drain them.
    pub async fn shutdown(self) {
        drop(self.queues);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

fn spawn_worker(
    sub: Arc<dyn Subscribe>,
    mut rx: mpsc::Receiver<Arc<Event>>,
    bus: Bus,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev))
                .catch_unwind()
                .await;
            if let Err(panic) = handled {
                bus.publish(Event::subscriber_panicked(sub.name(), panic_message(&*panic)));
            }
        }
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

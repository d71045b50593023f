//! # Runtime events emitted by the session and operator tasks.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Operator events**: task lifecycle (started, stopped, cancelled) and faults
//! - **Session events**: shutdown and grace handling
//! - **Subscriber events**: overflow and panics inside subscribers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the task
//! label, a term index and a reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use powser::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::FaultRaised)
//!     .with_task("recip#4")
//!     .with_index(0)
//!     .with_reason("division by zero");
//!
//! assert_eq!(ev.kind, EventKind::FaultRaised);
//! assert_eq!(ev.task.as_deref(), Some("recip#4"));
//! assert_eq!(ev.index, Some(0));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Session events ===
    /// Shutdown requested through [`Session::shutdown`](crate::Session::shutdown).
    ShutdownRequested,

    /// All operator tasks exited within the configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some operator tasks were still alive.
    ///
    /// Sets:
    /// - `reason`: comma separated labels of the stuck tasks
    GraceExceeded,

    // === Operator events ===
    /// An operator task started.
    ///
    /// Sets:
    /// - `task`: task label (`"<op>#<id>"`)
    OperatorStarted,

    /// An operator task finished: its output closed or its consumer went away.
    ///
    /// Sets:
    /// - `task`: task label
    OperatorStopped,

    /// An operator task was torn down by session cancellation.
    ///
    /// Sets:
    /// - `task`: task label
    OperatorCancelled,

    /// A split chain spawned the link responsible for one term position.
    ///
    /// Only published when [`Config::trace_links`](crate::Config::trace_links) is set.
    ///
    /// Sets:
    /// - `task`: split task label
    /// - `index`: term position owned by the new link
    LinkSpawned,

    /// An operator raised a fault into its output.
    ///
    /// Sets:
    /// - `task`: task label
    /// - `index`: term position, when known
    /// - `reason`: fault message
    FaultRaised,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Label of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Term position, if applicable.
    pub index: Option<u64>,
    /// Human-readable reason (faults, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            index: None,
            reason: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a task label.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a term position.
    #[inline]
    pub fn with_index(mut self, index: u64) -> Self {
        self.index = Some(index);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

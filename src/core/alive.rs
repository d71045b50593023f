//! # Operator lifecycle tracker with sequence-based ordering.
//!
//! Maintains the set of operator tasks that are currently alive, using event
//! sequence numbers to handle out-of-order delivery.
//!
//! ## Architecture
//! ```text
//! operator task ──► Bus ──► session listener ──► AliveTracker::update()
//!                                                       │
//!                                                       ▼
//!                                            HashMap<String, TaskState>
//!                                                (label → {seq, alive})
//! ```
//!
//! ## Rules
//! - Only `OperatorStarted` / `OperatorStopped` / `OperatorCancelled` change alive state
//! - Read operations (`snapshot`, `is_alive`) are **eventually consistent**
//! - Events with `seq <= last_seq` are **rejected** (stale)
//! - Finished tasks are forgotten, so the map only grows with live tasks

use crate::events::{Event, EventKind};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Per-task state for ordering validation.
#[derive(Debug, Clone)]
struct TaskState {
    /// Last seen sequence number for this task.
    last_seq: u64,
}

/// Thread-safe tracker of alive operator tasks.
///
/// Used by [`Session`](crate::Session) to report stuck tasks when a grace
/// period runs out.
pub struct AliveTracker {
    state: RwLock<HashMap<String, TaskState>>,
}

impl AliveTracker {
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Updates task state if the event is newer than the last one seen.
    ///
    /// Returns true if the alive set changed.
    ///
    /// ### State transitions
    /// - `OperatorStarted` → alive
    /// - `OperatorStopped` / `OperatorCancelled` → removed
    /// - Other events → ignored
    pub async fn update(&self, ev: &Event) -> bool {
        let name = match ev.task.as_deref() {
            Some(n) => n,
            None => return false,
        };

        let mut state = self.state.write().await;
        match ev.kind {
            EventKind::OperatorStarted => match state.get_mut(name) {
                Some(entry) if ev.seq <= entry.last_seq => false,
                Some(entry) => {
                    entry.last_seq = ev.seq;
                    false
                }
                None => {
                    state.insert(name.to_string(), TaskState { last_seq: ev.seq });
                    true
                }
            },
            EventKind::OperatorStopped | EventKind::OperatorCancelled => {
                match state.get(name) {
                    Some(entry) if ev.seq > entry.last_seq => {
                        state.remove(name);
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Returns the sorted list of currently alive task labels.
    pub async fn snapshot(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut alive: Vec<String> = state.keys().cloned().collect();
        alive.sort_unstable();
        alive
    }

    /// Returns true if the task is currently alive.
    pub async fn is_alive(&self, name: &str) -> bool {
        self.state.read().await.contains_key(name)
    }
}

impl Default for AliveTracker {
    fn default() -> Self {
        Self::new()
    }
}

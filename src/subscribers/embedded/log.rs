//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [started] task="mul#3"
//! [link] task="split#5" index=4
//! [fault] task="recip#9" index=0 reason="division by zero"
//! [stopped] task="mul#3"
//! [cancelled] task="exp#2"
//! [shutdown-requested]
//! [all-stopped-within-grace]
//! [grace-exceeded] stuck="split#5"
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::GraceExceeded => {
                println!("[grace-exceeded] stuck={:?}", e.reason);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::AllStoppedWithin => {
                println!("[all-stopped-within-grace]");
            }
            EventKind::OperatorStarted => {
                println!("[started] task={:?}", e.task);
            }
            EventKind::OperatorStopped => {
                println!("[stopped] task={:?}", e.task);
            }
            EventKind::OperatorCancelled => {
                println!("[cancelled] task={:?}", e.task);
            }
            EventKind::LinkSpawned => {
                println!("[link] task={:?} index={:?}", e.task, e.index);
            }
            EventKind::FaultRaised => {
                println!(
                    "[fault] task={:?} index={:?} reason={:?}",
                    e.task, e.index, e.reason
                );
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={:?} reason={:?}",
                    e.task, e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} info={}",
                    e.task.as_deref().unwrap_or("unknown"),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

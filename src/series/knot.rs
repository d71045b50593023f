//! # Self-referential series.
//!
//! A knot splits a series whose definition consumes one of its own forks:
//!
//! ```text
//!            ┌──────────── feedback fork (Reader) ◄─────┐
//!            ▼                                          │
//!   define(feedback) ──► source (Writer) ──► split ─────┤
//!                                                       └──► output fork
//! ```
//!
//! The source counts the terms it has handed to the split chain. The feedback
//! fork refuses to read term `k` until `k` terms have been produced; breaking
//! that rule faults the feedback fork with a contract violation instead of
//! deadlocking.
//!
//! The output fork anchors the chain: once its consumer is gone the whole
//! loop is torn down, since the feedback fork alone would keep it alive.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use crate::core::Session;
use crate::series::{PowerSeries, Tether, pipe, split};

/// Builds `S = define(S)` and returns a fork of `S` for the caller.
///
/// `define` receives the feedback fork and returns the series that defines
/// `S`; term `i` of its result may only depend on terms `< i` of the fork.
pub(crate) fn tie<F>(session: &Session, op: &str, define: F) -> PowerSeries
where
    F: FnOnce(PowerSeries) -> PowerSeries,
{
    let produced = Arc::new(AtomicU64::new(0));
    let (feedback_supply, mut feedback) = pipe(session);
    let (output_supply, output) = pipe(session);

    feedback.set_tether(Tether::Reader {
        produced: Arc::clone(&produced),
        read: 0,
        knot: session.label(op),
    });

    let mut source = define(feedback);
    source.set_tether(Tether::Writer(produced));
    split::spawn_knot(session, source, feedback_supply, output_supply);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficient::Coefficient;
    use crate::core::Config;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_lagged_feedback_is_allowed() {
        // S = 1 + x·S  →  1, 1, 1, …
        let session = Session::new(Config::default());
        let mut s = tie(&session, "geometric", |fb| fb.shift(Coefficient::one()));
        let ones = vec![Coefficient::one(); 6];
        assert_eq!(s.pull_n(6).await.unwrap(), ones);
    }

    #[tokio::test]
    async fn test_dropping_output_tears_the_loop_down() {
        let session = Session::new(Config {
            grace: std::time::Duration::from_secs(2),
            ..Config::default()
        });
        let mut s = tie(&session, "geometric", |fb| fb.shift(Coefficient::one()));
        s.pull_n(4).await.unwrap();
        drop(s);

        session.join_idle().await.unwrap();
    }

    #[tokio::test]
    async fn test_reading_ahead_is_a_contract_violation() {
        // S = S + 1 reads term i of itself while producing term i.
        let session = Session::new(Config::default());
        let mut rx = session.subscribe();
        let mut s = tie(&session, "eager", |fb| crate::ops::add(fb, session.ones()));

        let err = s.pull().await.unwrap_err();
        assert_eq!(err.as_label(), "series_contract_violation");
        assert_eq!(s.pull().await, Ok(None));

        let fault = loop {
            let ev = rx.recv().await.unwrap();
            if ev.kind == EventKind::FaultRaised {
                break ev;
            }
        };
        assert!(fault.task.as_deref().unwrap().starts_with("eager#"));
        assert_eq!(fault.index, Some(0));
    }
}

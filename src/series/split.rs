//! # Split: one source, two independently paced forks.
//!
//! The fork is served by a chain of short-lived link tasks `W0, W1, …`; link
//! `Wi` owns term `i`.
//!
//! ## Architecture
//! ```text
//!            source
//!              │ pull (only place the source is touched)
//!              ▼
//!   ┌────┐ release(slow) ┌────┐ release(slow) ┌────┐
//!   │ W0 │ ────────────► │ W1 │ ────────────► │ W2 │ ─► …
//!   └────┘               └────┘               └────┘
//!     │ fast handle moves to the successor as soon as Wi has pulled
//!     └─► term i to fast now, to slow once Wi-1 has released it
//! ```
//!
//! ## Link protocol
//! 1. Wait for a fast request or the release from the senior link. After a
//!    release, race both sides; if the slow side asks first the labels swap.
//! 2. Pull term `i` from the source.
//! 3. Spawn `Wi+1` with the fast handle and a fresh release slot.
//! 4. Answer the fast request.
//! 5. Wait for the release if it has not arrived yet.
//! 6. Answer the slow side, then release `Wi+1` with the slow handle.
//!
//! ## Rules
//! - Memory held by the chain is one term per link, i.e. proportional to the
//!   lag between the forks.
//! - A release carrying `None` means the slow side was abandoned; the
//!   remaining side then reads the source directly.
//! - A dropped release sender stops the chain. This happens when an anchored
//!   side is abandoned: the other side only exists to feed the source.
//! - End-of-stream and faults stop the chain: no successor is spawned.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::oneshot;

use crate::channel::{Request, Supply};
use crate::coefficient::Coefficient;
use crate::core::Session;
use crate::error::SeriesError;
use crate::series::PowerSeries;

/// One fork as seen by the chain.
struct Side {
    supply: Supply,
    /// Abandoning this side stops the whole chain.
    anchor: bool,
}

impl Side {
    fn free(supply: Supply) -> Self {
        Self {
            supply,
            anchor: false,
        }
    }

    /// Next request, or the fate of the chain once this side is abandoned.
    async fn next_request(&mut self) -> Result<Request, Gone> {
        match self.supply.next_request().await {
            Some(req) => Ok(req),
            None if self.anchor => Err(Gone::Stop),
            None => Err(Gone::Side),
        }
    }
}

/// Why a side stopped requesting.
enum Gone {
    /// The side was abandoned; the other one carries on.
    Side,
    /// An anchored side was abandoned; everything goes.
    Stop,
}

/// Slow-side handle travelling down the chain; `None` once that side is gone.
type Release = oneshot::Receiver<Option<Side>>;

/// Starts a chain serving `a` and `b` from `source`.
pub(crate) fn spawn_split(session: &Session, source: PowerSeries, a: Supply, b: Supply) {
    spawn_chain(session, source, Side::free(a), Side::free(b));
}

/// Starts a chain whose `output` side keeps the chain alive; `feedback` is
/// consumed by `source` itself.
pub(crate) fn spawn_knot(
    session: &Session,
    source: PowerSeries,
    feedback: Supply,
    output: Supply,
) {
    let output = Side {
        supply: output,
        anchor: true,
    };
    spawn_chain(session, source, Side::free(feedback), output);
}

fn spawn_chain(session: &Session, source: PowerSeries, a: Side, b: Side) {
    let (tx, release) = oneshot::channel();
    // W0 starts released: it holds both sides.
    let _ = tx.send(Some(b));

    Link {
        chain: session.label("split"),
        session: session.clone(),
        index: 0,
        source,
        fast: a,
        release,
    }
    .spawn();
}

/// One link of the chain, responsible for term `index`.
struct Link {
    chain: Arc<str>,
    session: Session,
    index: u64,
    source: PowerSeries,
    fast: Side,
    release: Release,
}

/// How a link was woken in step 1.
enum Wake {
    /// The fast side asked first; the slow handle is still upstream.
    Fast(Request, Side, Release),
    /// Both handles are here; the first one asked first.
    Both(Request, Side, Side),
    /// Only one side is left; it reads the source directly.
    PassThrough(Side),
    /// Nothing left to serve.
    Done,
}

impl Link {
    fn spawn(self) {
        let session = self.session.clone();
        session.trace_link(&self.chain, self.index);
        let label: Arc<str> = format!("{}/{}", self.chain, self.index).into();
        session.spawn_as(label, self.run());
    }

    fn run(self) -> BoxFuture<'static, ()> {
        async move {
            let Link {
                chain,
                session,
                index,
                mut source,
                fast,
                release,
            } = self;

            let (req, first, slow) = match Self::wake(fast, release).await {
                Wake::Fast(req, first, release) => (req, first, Err(release)),
                Wake::Both(req, first, second) => (req, first, Ok(Some(second))),
                Wake::PassThrough(side) => return side.supply.forward(source).await,
                Wake::Done => return,
            };

            let term = source.pull().await;

            let successor = match &term {
                Ok(Some(_)) => {
                    let (tx, release) = oneshot::channel();
                    Link {
                        chain,
                        session,
                        index: index + 1,
                        source,
                        fast: first,
                        release,
                    }
                    .spawn();
                    Some(tx)
                }
                _ => {
                    drop(source);
                    drop(first);
                    None
                }
            };

            answer(req, &term);

            let slow = match slow {
                Ok(slow) => slow,
                Err(release) => match release.await {
                    Ok(slow) => slow,
                    // senior link stopped the chain
                    Err(_) => return,
                },
            };

            let slow = match (slow, &term) {
                (Some(mut slow), Ok(Some(_)) | Err(_)) => match slow.next_request().await {
                    Ok(req) => {
                        answer(req, &term);
                        Some(slow)
                    }
                    Err(Gone::Side) => None,
                    Err(Gone::Stop) => return,
                },
                // end-of-stream: dropping the handle closes the slow side
                (slow, _) => {
                    drop(slow);
                    None
                }
            };

            if let Some(tx) = successor {
                let _ = tx.send(slow);
            }
        }
        .boxed()
    }

    /// Step 1: decide which side is served first.
    async fn wake(mut fast: Side, mut release: Release) -> Wake {
        let slow = tokio::select! {
            req = fast.next_request() => {
                return match req {
                    Ok(req) => Wake::Fast(req, fast, release),
                    Err(Gone::Stop) => Wake::Done,
                    Err(Gone::Side) => match release.await {
                        Ok(Some(slow)) => Wake::PassThrough(slow),
                        _ => Wake::Done,
                    },
                };
            }
            slow = &mut release => match slow {
                Ok(slow) => slow,
                Err(_) => return Wake::Done,
            },
        };

        let Some(mut slow) = slow else {
            return Wake::PassThrough(fast);
        };

        tokio::select! {
            req = fast.next_request() => match req {
                Ok(req) => Wake::Both(req, fast, slow),
                Err(Gone::Side) => Wake::PassThrough(slow),
                Err(Gone::Stop) => Wake::Done,
            },
            req = slow.next_request() => match req {
                Ok(req) => Wake::Both(req, slow, fast),
                Err(Gone::Side) => Wake::PassThrough(fast),
                Err(Gone::Stop) => Wake::Done,
            },
        }
    }
}

/// Answers one side with the link's term.
fn answer(req: Request, term: &Result<Option<Coefficient>, SeriesError>) {
    match term {
        Ok(Some(c)) => {
            req.respond(c.clone());
        }
        Ok(None) => req.close(),
        Err(e) => req.fail(e.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::series::pipe;
    use std::time::Duration;

    fn naturals(session: &Session, n: i64) -> PowerSeries {
        let (mut supply, series) = pipe(session);
        session.spawn("naturals", async move {
            for k in 0..n {
                match supply.next_request().await {
                    Some(req) => {
                        req.respond(Coefficient::from_integer(k));
                    }
                    None => return,
                }
            }
        });
        series
    }

    fn ints(v: &[i64]) -> Vec<Coefficient> {
        v.iter().copied().map(Coefficient::from_integer).collect()
    }

    #[tokio::test]
    async fn test_fast_side_runs_ahead() {
        let session = Session::new(Config::default());
        let (mut a, mut b) = naturals(&session, 10).split();

        assert_eq!(a.pull_n(5).await.unwrap(), ints(&[0, 1, 2, 3, 4]));
        assert_eq!(b.pull_n(3).await.unwrap(), ints(&[0, 1, 2]));
        assert_eq!(a.pull_n(2).await.unwrap(), ints(&[5, 6]));
        assert_eq!(b.pull_all().await.unwrap(), ints(&[3, 4, 5, 6, 7, 8, 9]));
        assert_eq!(a.pull_all().await.unwrap(), ints(&[7, 8, 9]));
    }

    #[tokio::test]
    async fn test_slow_side_may_go_first() {
        let session = Session::new(Config::default());
        let (mut a, mut b) = naturals(&session, 4).split();

        assert_eq!(b.pull_n(4).await.unwrap(), ints(&[0, 1, 2, 3]));
        assert_eq!(b.pull().await, Ok(None));
        assert_eq!(a.pull_all().await.unwrap(), ints(&[0, 1, 2, 3]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_agree() {
        let session = Session::new(Config::default());
        let (mut a, mut b) = naturals(&session, 200).split();

        let ta = tokio::spawn(async move { a.pull_all().await });
        let tb = tokio::spawn(async move { b.pull_all().await });
        let expected: Vec<i64> = (0..200).collect();

        assert_eq!(ta.await.unwrap().unwrap(), ints(&expected));
        assert_eq!(tb.await.unwrap().unwrap(), ints(&expected));
    }

    #[tokio::test]
    async fn test_dropped_fork_degrades_to_pass_through() {
        let session = Session::new(Config {
            grace: Duration::from_secs(2),
            ..Config::default()
        });
        let (mut a, b) = naturals(&session, 50).split();

        assert_eq!(a.pull_n(3).await.unwrap(), ints(&[0, 1, 2]));
        drop(b);
        let rest = a.pull_all().await.unwrap();
        assert_eq!(rest.len(), 47);
        assert_eq!(rest[0], Coefficient::from_integer(3));
        drop(a);

        session.join_idle().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropping_both_forks_releases_source() {
        let session = Session::new(Config {
            grace: Duration::from_secs(2),
            ..Config::default()
        });
        let (mut a, b) = naturals(&session, i64::MAX).split();
        a.pull_n(5).await.unwrap();
        drop(a);
        drop(b);

        session.join_idle().await.unwrap();
    }

    #[tokio::test]
    async fn test_fault_reaches_both_forks() {
        let session = Session::new(Config::default());
        let (mut supply, source) = pipe(&session);
        session.spawn("faulty", async move {
            if let Some(req) = supply.next_request().await {
                req.respond(Coefficient::one());
            }
            if let Some(req) = supply.next_request().await {
                req.fail(SeriesError::DivisionByZero);
            }
        });

        let (mut a, mut b) = source.split();
        assert_eq!(a.pull().await, Ok(Some(Coefficient::one())));
        assert_eq!(a.pull().await, Err(SeriesError::DivisionByZero));
        assert_eq!(b.pull().await, Ok(Some(Coefficient::one())));
        assert_eq!(b.pull().await, Err(SeriesError::DivisionByZero));
        assert_eq!(b.pull().await, Ok(None));
    }

    #[tokio::test]
    async fn test_trace_links_publishes_one_event_per_link() {
        let session = Session::new(Config {
            trace_links: true,
            ..Config::default()
        });
        let mut rx = session.subscribe();
        let (mut a, _b) = naturals(&session, 3).split();
        a.pull_all().await.unwrap();

        let mut links = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == crate::events::EventKind::LinkSpawned {
                links.push(ev.index);
            }
        }
        // W0..W3: the last link observes end-of-stream
        assert_eq!(links, vec![Some(0), Some(1), Some(2), Some(3)]);
    }
}

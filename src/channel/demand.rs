//! # Demand channel: one value per explicit request.
//!
//! A demand channel pairs a consumer ([`Demand`]) with a producer ([`Supply`]).
//! The consumer registers demand by sending a one-shot reply slot; the producer
//! picks the slot up as a [`Request`] and answers it exactly once.
//!
//! ## Architecture
//! ```text
//!  consumer                                         producer
//!  Demand::request() ── mpsc(1): oneshot::Sender ──► Supply::next_request()
//!        ▲                                                  │
//!        │                                           Request::respond(c)
//!        └─────────────── oneshot: Term ◄──────────── Request::close()
//!                                                     Request::fail(e)
//! ```
//!
//! ## States
//! - **Active**: both halves alive.
//! - **Closed**: the producer dropped its [`Supply`] (or answered with
//!   [`Request::close`]); every outstanding and future request observes
//!   end-of-stream.
//! - **Abandoned**: the consumer dropped its [`Demand`];
//!   [`Supply::next_request`] returns `None` so the producer tears down instead
//!   of blocking.
//!
//! ## Rules
//! - A response needs a [`Request`] token and consumes it, so answering twice
//!   or answering without an outstanding request does not compile.
//! - Dropping an unanswered [`Request`] is a close notice for that request.
//! - `next_request` is cancel-safe and may be raced in `select!`.
//! - `request` is **not** cancel-safe: a cancelled request loses its term.

use tokio::sync::{mpsc, oneshot};

use crate::coefficient::Coefficient;
use crate::error::SeriesError;

/// One answer on the wire: a term or a terminal fault.
type Term = Result<Coefficient, SeriesError>;

type Slot = oneshot::Sender<Term>;

/// Observable lifecycle of one half of a demand channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Both halves are alive.
    Active,
    /// The producer has no more items.
    Closed,
    /// The consumer will issue no more requests.
    Abandoned,
}

/// Creates a fresh demand channel.
pub fn demand_channel() -> (Supply, Demand) {
    let (tx, rx) = mpsc::channel::<Slot>(1);
    (
        Supply {
            rx,
            state: ChannelState::Active,
        },
        Demand {
            tx,
            state: ChannelState::Active,
        },
    )
}

/// Consumer half: pulls one item per call.
#[derive(Debug)]
pub struct Demand {
    tx: mpsc::Sender<Slot>,
    state: ChannelState,
}

impl Demand {
    /// Signals demand and waits for the answer.
    ///
    /// Returns `Ok(Some(c))` for a term, `Ok(None)` once the channel is closed
    /// and `Err` for a fault. After `Ok(None)` or `Err` every later call returns
    /// `Ok(None)` without touching the producer.
    pub async fn request(&mut self) -> Result<Option<Coefficient>, SeriesError> {
        if self.state != ChannelState::Active {
            return Ok(None);
        }
        let (slot, reply) = oneshot::channel();
        if self.tx.send(slot).await.is_err() {
            self.state = ChannelState::Closed;
            return Ok(None);
        }
        match reply.await {
            Ok(Ok(c)) => Ok(Some(c)),
            Ok(Err(e)) => {
                self.terminate();
                Err(e)
            }
            Err(_closed) => {
                self.state = ChannelState::Closed;
                Ok(None)
            }
        }
    }

    /// Stops requesting: the producer observes abandonment and later calls
    /// return `Ok(None)`.
    pub(crate) fn terminate(&mut self) {
        let (closed, _) = mpsc::channel(1);
        self.tx = closed;
        self.state = ChannelState::Closed;
    }

    /// Current state as seen by the consumer.
    pub fn state(&self) -> ChannelState {
        if self.state == ChannelState::Active && self.tx.is_closed() {
            ChannelState::Closed
        } else {
            self.state
        }
    }
}

/// Producer half: waits for demand and answers it.
#[derive(Debug)]
pub struct Supply {
    rx: mpsc::Receiver<Slot>,
    state: ChannelState,
}

impl Supply {
    /// Waits for the next request.
    ///
    /// Returns `None` once the consumer has abandoned the channel; the producer
    /// should then release everything it holds.
    pub async fn next_request(&mut self) -> Option<Request> {
        if self.state != ChannelState::Active {
            return None;
        }
        match self.rx.recv().await {
            Some(slot) => Some(Request(slot)),
            None => {
                self.state = ChannelState::Abandoned;
                None
            }
        }
    }

    /// Current state as seen by the producer.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Declares end-of-stream; pending and future requests observe `Ok(None)`.
    pub fn close(self) {
        drop(self);
    }

    /// Answers every request from `source` until either side ends.
    ///
    /// Used when a producer has nothing left to add and the remainder of its
    /// output is exactly the remainder of `source`.
    pub async fn forward(mut self, mut source: crate::PowerSeries) {
        while let Some(req) = self.next_request().await {
            if !req.deliver(source.pull().await) {
                return;
            }
        }
    }
}

/// An accepted, not yet answered request.
#[derive(Debug)]
#[must_use = "dropping a Request answers it with end-of-stream"]
pub struct Request(Slot);

impl Request {
    /// Delivers one value. Returns false if the requester went away meanwhile.
    pub fn respond(self, c: Coefficient) -> bool {
        self.0.send(Ok(c)).is_ok()
    }

    /// Answers with end-of-stream.
    pub fn close(self) {
        drop(self);
    }

    /// Answers with a terminal fault.
    pub fn fail(self, e: SeriesError) {
        let _ = self.0.send(Err(e));
    }

    /// Answers with the outcome of an upstream pull.
    ///
    /// Returns true when a value was delivered and the producer should go on.
    pub(crate) fn deliver(self, pulled: Result<Option<Coefficient>, SeriesError>) -> bool {
        match pulled {
            Ok(Some(c)) => {
                self.respond(c);
                true
            }
            Ok(None) => false,
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }
}

//! # PowerSeries: a consumer handle over a demand channel of coefficients.
//!
//! Each series is read once, front to back. Dropping a series abandons its
//! channel, which tears down the task feeding it and, transitively, every
//! upstream task that only this series kept alive.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::channel::{ChannelState, Demand, Supply, demand_channel};
use crate::coefficient::Coefficient;
use crate::core::Session;
use crate::error::SeriesError;

/// Bookkeeping for series that take part in a self-referential definition.
#[derive(Debug)]
pub(crate) enum Tether {
    /// Ordinary series.
    Free,
    /// Source of a self-referential split; counts the terms it has produced.
    Writer(Arc<AtomicU64>),
    /// Feedback fork of a self-referential split; may only read produced terms.
    Reader {
        produced: Arc<AtomicU64>,
        read: u64,
        knot: Arc<str>,
    },
}

/// A lazily produced formal power series `c0 + c1·x + c2·x² + …`.
///
/// Every term is computed on demand by the task feeding this handle.
#[derive(Debug)]
pub struct PowerSeries {
    demand: Demand,
    session: Session,
    tether: Tether,
}

/// Creates a fresh series and the producer half that feeds it.
pub(crate) fn pipe(session: &Session) -> (Supply, PowerSeries) {
    let (supply, demand) = demand_channel();
    (
        supply,
        PowerSeries {
            demand,
            session: session.clone(),
            tether: Tether::Free,
        },
    )
}

impl PowerSeries {
    /// Pulls the next term.
    ///
    /// Returns `Ok(Some(c))` for a term, `Ok(None)` at end-of-stream and `Err`
    /// for a fault. A fault is reported once; later pulls return `Ok(None)`.
    pub async fn pull(&mut self) -> Result<Option<Coefficient>, SeriesError> {
        let ahead = match &self.tether {
            Tether::Reader {
                produced,
                read,
                knot,
            } if *read >= produced.load(Ordering::Acquire) => Some((Arc::clone(knot), *read)),
            _ => None,
        };
        if let Some((knot, read)) = ahead {
            let err = SeriesError::contract(format!(
                "self-referential read of term {read} before it was produced"
            ));
            self.session.report_fault(&knot, read, &err);
            self.tether = Tether::Free;
            self.demand.terminate();
            return Err(err);
        }

        let pulled = self.demand.request().await;
        if let Ok(Some(_)) = &pulled {
            match &mut self.tether {
                Tether::Free => {}
                Tether::Writer(produced) => {
                    produced.fetch_add(1, Ordering::AcqRel);
                }
                Tether::Reader { read, .. } => *read += 1,
            }
        }
        pulled
    }

    /// Pulls up to `n` terms, stopping early at end-of-stream.
    pub async fn pull_n(&mut self, n: usize) -> Result<Vec<Coefficient>, SeriesError> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            match self.pull().await? {
                Some(c) => out.push(c),
                None => break,
            }
        }
        Ok(out)
    }

    /// Pulls every remaining term. Does not return for an infinite series.
    pub async fn pull_all(&mut self) -> Result<Vec<Coefficient>, SeriesError> {
        let mut out = Vec::new();
        while let Some(c) = self.pull().await? {
            out.push(c);
        }
        Ok(out)
    }

    /// Evaluates the first `n` terms at `x` as `c0 + x(c1 + x(c2 + …))`.
    ///
    /// Terms past the end of a finite series count as zero.
    pub async fn evaluate_at(
        &mut self,
        x: &Coefficient,
        n: usize,
    ) -> Result<Coefficient, SeriesError> {
        let terms = self.pull_n(n).await?;
        Ok(terms
            .into_iter()
            .rev()
            .fold(Coefficient::zero(), |acc, c| c + acc * x))
    }

    /// Floating-point evaluation of the first `n` terms at `x`.
    pub async fn evaluate_f64(&mut self, x: f64, n: usize) -> Result<f64, SeriesError> {
        let mut sum = 0.0;
        let mut xi = 1.0;
        for c in self.pull_n(n).await? {
            sum += c.to_f64() * xi;
            xi *= x;
        }
        Ok(sum)
    }

    /// Replicates this series into two independently paced copies.
    pub fn split(self) -> (PowerSeries, PowerSeries) {
        let session = self.session.clone();
        let (a_supply, a) = pipe(&session);
        let (b_supply, b) = pipe(&session);
        super::split::spawn_split(&session, self, a_supply, b_supply);
        (a, b)
    }

    /// Releases this series; upstream tasks observe abandonment.
    pub fn drop_series(self) {
        drop(self);
    }

    /// The session hosting the task that feeds this series.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Channel state as seen from this consumer.
    pub fn state(&self) -> ChannelState {
        self.demand.state()
    }

    pub(crate) fn set_tether(&mut self, tether: Tether) {
        self.tether = tether;
    }
}

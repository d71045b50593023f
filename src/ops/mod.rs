//! # Constructors and operators on power series.
//!
//! Every constructor and operator returns immediately with a new
//! [`PowerSeries`]; the work happens in one task per call, which loops
//! "wait for demand → pull upstream → compute → answer".
//!
//! - `constructors`: `ad_infinitum`, `monomial`, `binomial`, `polynomial`
//! - `named`: `ones`, `factorials`, `fibonaccis`, `sincos`, …
//! - `arithmetic`: [`add`], [`multiply`], `plus`, `minus`, `scale`, `shift`, …
//! - `calculus`: `derivative`, `integral`, `exponential`
//! - `reciprocal`: `reciprocal`
//! - `compose`: `substitute`, `monomial_substitute`

mod arithmetic;
mod calculus;
mod compose;
mod constructors;
mod named;
mod reciprocal;

pub use arithmetic::{add, multiply};

use crate::channel::Supply;
use crate::coefficient::Coefficient;
use crate::core::Session;
use crate::series::{PowerSeries, pipe};

impl Session {
    /// Spawns a leaf series answering each request with `next()` until it
    /// returns `None`.
    pub(crate) fn generate<F>(&self, op: &str, mut next: F) -> PowerSeries
    where
        F: FnMut() -> Option<Coefficient> + Send + 'static,
    {
        let (mut out, series) = pipe(self);
        self.spawn(op, async move {
            while let Some(req) = out.next_request().await {
                match next() {
                    Some(c) => {
                        req.respond(c);
                    }
                    None => return req.close(),
                }
            }
        });
        series
    }
}

impl PowerSeries {
    /// Spawns a term-wise map: term `i` of the result is `f(i, u_i)`.
    pub(crate) fn map_terms<F>(self, op: &str, f: F) -> PowerSeries
    where
        F: FnMut(u64, Coefficient) -> Coefficient + Send + 'static,
    {
        let session = self.session().clone();
        let (out, series) = pipe(&session);
        session.spawn(op, map_each(out, self, 0, f));
        series
    }
}

/// Answers every request on `out` with `f(i, u)` for the next term `u` of
/// `source`, counting `i` from `start`.
pub(crate) async fn map_each<F>(mut out: Supply, mut source: PowerSeries, start: u64, mut f: F)
where
    F: FnMut(u64, Coefficient) -> Coefficient,
{
    let mut i = start;
    while let Some(req) = out.next_request().await {
        let pulled = source.pull().await.map(|t| t.map(|c| f(i, c)));
        if !req.deliver(pulled) {
            return;
        }
        i += 1;
    }
}

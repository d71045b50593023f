//! Composition of series.

use crate::coefficient::Coefficient;
use crate::ops::multiply;
use crate::series::{PowerSeries, pipe};

impl PowerSeries {
    /// Composition `U(V(x))`.
    ///
    /// `V` should have a zero constant term; a nonzero one is discarded.
    /// With `U = u + x·UU`: `U(V) = u + (V/x)·UU(V)`.
    pub fn substitute(self, v: PowerSeries) -> PowerSeries {
        let session = self.session().clone();
        let (mut out, series) = pipe(&session);
        session.spawn("subst", async move {
            let mut u = self;
            let (mut vv0, vv1) = v.split();
            let Some(req) = out.next_request().await else {
                return;
            };
            if !req.deliver(u.pull().await) {
                return;
            }
            // constant term of V
            match vv0.pull().await {
                Ok(Some(_)) => {}
                Ok(None) => return,
                Err(e) => {
                    if let Some(req) = out.next_request().await {
                        req.fail(e);
                    }
                    return;
                }
            }
            out.forward(multiply(vv0, u.substitute(vv1))).await;
        });
        series
    }

    /// Monomial substitution `U(c·xⁿ)`: term `i` of `U` times `cⁱ`, each
    /// followed by `n − 1` zeros.
    ///
    /// `n = 0` yields the empty series and releases `U`.
    pub fn monomial_substitute(self, c: Coefficient, n: usize) -> PowerSeries {
        let session = self.session().clone();
        let (mut out, series) = pipe(&session);
        session.spawn("monsubst", async move {
            if n == 0 {
                return;
            }
            let mut u = self;
            let mut power = Coefficient::one();
            while let Some(req) = out.next_request().await {
                let pulled = u.pull().await.map(|t| t.map(|ui| ui * &power));
                if !req.deliver(pulled) {
                    return;
                }
                power = power * &c;
                for _ in 1..n {
                    let Some(req) = out.next_request().await else {
                        return;
                    };
                    req.respond(Coefficient::zero());
                }
            }
        });
        series
    }
}

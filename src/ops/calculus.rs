//! Formal differentiation, integration and the exponential.

use crate::coefficient::Coefficient;
use crate::ops::{map_each, multiply};
use crate::series::{PowerSeries, knot, pipe};

impl PowerSeries {
    /// Formal derivative: drops `u0`, term `i` becomes `i·u_i`.
    pub fn derivative(self) -> PowerSeries {
        let session = self.session().clone();
        let (mut out, series) = pipe(&session);
        session.spawn("deriv", async move {
            let mut u = self;
            let Some(req) = out.next_request().await else {
                return;
            };
            match u.pull().await {
                Ok(Some(_)) => {}
                Ok(None) => return req.close(),
                Err(e) => return req.fail(e),
            }
            if req.deliver(u.pull().await) {
                map_each(out, u, 2, |i, c| c * Coefficient::from_index(i)).await;
            }
        });
        series
    }

    /// Formal integral with constant of integration `c`: `c`, then `u_i/(i+1)`.
    pub fn integral(self, c: Coefficient) -> PowerSeries {
        let session = self.session().clone();
        let (mut out, series) = pipe(&session);
        session.spawn("integ", async move {
            let Some(req) = out.next_request().await else {
                return;
            };
            if req.respond(c) {
                map_each(out, self, 1, |i, u| u * Coefficient::unit_fraction(i)).await;
            }
        });
        series
    }

    /// `exp(U)` for `U` with zero constant term (a nonzero one is ignored).
    ///
    /// Solves `Z' = Z·U'` with `Z(0) = 1`, i.e. `Z = ∫ Z·U' + 1`, feeding `Z`
    /// back into its own definition.
    pub fn exponential(self) -> PowerSeries {
        let session = self.session().clone();
        knot::tie(&session, "exp", move |z| {
            multiply(z, self.derivative()).integral(Coefficient::one())
        })
    }
}

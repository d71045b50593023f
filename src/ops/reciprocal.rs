//! Multiplicative inverse of a series.

use crate::error::SeriesError;
use crate::ops::multiply;
use crate::series::{PowerSeries, knot, pipe};

impl PowerSeries {
    /// `1/U` for `U` with a nonzero leading coefficient.
    ///
    /// With `U = u + x·UU` and `1/U = z + x·ZZ`: `z = 1/u` and
    /// `ZZ = −z·UU·(z + x·ZZ)`, where `ZZ` reads its own earlier terms.
    ///
    /// The result stays lazy: a zero or missing leading coefficient surfaces
    /// as [`SeriesError::DivisionByZero`] on the first pull.
    pub fn reciprocal(self) -> PowerSeries {
        let session = self.session().clone();
        let (mut out, series) = pipe(&session);
        let label = session.label("recip");
        let task = session.clone();

        session.spawn_as(label.clone(), async move {
            let mut u = self;
            let Some(req) = out.next_request().await else {
                return;
            };
            let z = match u.pull().await {
                Ok(Some(u0)) => u0.inv(),
                Ok(None) => None,
                Err(e) => return req.fail(e),
            };
            let Some(z) = z else {
                task.report_fault(&label, 0, &SeriesError::DivisionByZero);
                return req.fail(SeriesError::DivisionByZero);
            };
            if !req.respond(z.clone()) {
                return;
            }

            let minus_z = -&z;
            let zz = knot::tie(&task, "recip_tail", move |zz| {
                multiply(u.scale(minus_z), zz.shift(z))
            });
            out.forward(zz).await;
        });
        series
    }
}

//! Leaf series built from coefficients.

use crate::coefficient::Coefficient;
use crate::core::Session;
use crate::series::PowerSeries;

impl Session {
    /// `c, c, c, …` forever.
    pub fn ad_infinitum(&self, c: Coefficient) -> PowerSeries {
        self.generate("ad_infinitum", move || Some(c.clone()))
    }

    /// The monomial `c·xⁿ`: `n` zeros, then `c`, then end-of-stream.
    ///
    /// A zero coefficient gives the empty series.
    pub fn monomial(&self, c: Coefficient, n: usize) -> PowerSeries {
        let mut zeros = if c.is_zero() { None } else { Some(n) };
        self.generate("monomial", move || match zeros {
            Some(0) => {
                zeros = None;
                Some(c.clone())
            }
            Some(k) => {
                zeros = Some(k - 1);
                Some(Coefficient::zero())
            }
            None => None,
        })
    }

    /// Coefficients of `(1+x)^c` by the binomial theorem.
    ///
    /// Ends after `C(c, c)` for a non-negative integer `c`; infinite otherwise,
    /// so the caller must bound how many terms it pulls.
    pub fn binomial(&self, c: Coefficient) -> PowerSeries {
        let mut next = Some(Coefficient::one());
        let mut k: u64 = 0;
        self.generate("binomial", move || {
            let t = next.take()?;
            // t_{k+1} = t_k·(c − k)/(k + 1)
            let factor = &c - &Coefficient::from_index(k);
            if !factor.is_zero() {
                next = Some(t.clone() * factor * Coefficient::unit_fraction(k + 1));
            }
            k += 1;
            Some(t)
        })
    }

    /// The finite series `a0 + a1·x + …` with trailing zeros stripped.
    pub fn polynomial<I>(&self, coefficients: I) -> PowerSeries
    where
        I: IntoIterator<Item = Coefficient>,
    {
        let mut terms: Vec<Coefficient> = coefficients.into_iter().collect();
        while terms.last().is_some_and(Coefficient::is_zero) {
            terms.pop();
        }
        let mut terms = terms.into_iter();
        self.generate("polynomial", move || terms.next())
    }
}

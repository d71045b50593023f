//! Sums, scalings, shifts and products.

use std::ops;

use crate::coefficient::Coefficient;
use crate::series::{PowerSeries, pipe};

/// Term-wise sum `U + V`.
///
/// When one input ends first, the remainder of the other is passed through
/// unchanged.
pub fn add(u: PowerSeries, v: PowerSeries) -> PowerSeries {
    let session = u.session().clone();
    let (mut out, sum) = pipe(&session);
    session.spawn("add", async move {
        let (mut u, mut v) = (u, v);
        while let Some(req) = out.next_request().await {
            match tokio::join!(u.pull(), v.pull()) {
                (Err(e), _) | (_, Err(e)) => return req.fail(e),
                (Ok(Some(a)), Ok(Some(b))) => {
                    req.respond(a + b);
                }
                (Ok(Some(a)), Ok(None)) => {
                    req.respond(a);
                    return out.forward(u).await;
                }
                (Ok(None), Ok(Some(b))) => {
                    req.respond(b);
                    return out.forward(v).await;
                }
                (Ok(None), Ok(None)) => return req.close(),
            }
        }
    });
    sum
}

/// Product `U·V`.
///
/// With `U = u + x·UU` and `V = v + x·VV`:
/// `UV = uv + x·(u·VV + v·UU) + x²·(UU·VV)`. Either input being empty makes
/// the product empty.
pub fn multiply(u: PowerSeries, v: PowerSeries) -> PowerSeries {
    let session = u.session().clone();
    let (mut out, product) = pipe(&session);
    session.spawn("mul", async move {
        let (mut u, mut v) = (u, v);
        let Some(req) = out.next_request().await else {
            return;
        };
        let (u0, v0) = match tokio::join!(u.pull(), v.pull()) {
            (Err(e), _) | (_, Err(e)) => return req.fail(e),
            (Ok(Some(a)), Ok(Some(b))) => (a, b),
            _ => return req.close(),
        };
        req.respond(&u0 * &v0);

        let (uu0, uu1) = u.split();
        let (vv0, vv1) = v.split();
        let mut w = add(vv0.scale(u0), uu0.scale(v0));

        let Some(req) = out.next_request().await else {
            return;
        };
        if !req.deliver(w.pull().await) {
            return;
        }
        out.forward(add(w, multiply(uu1, vv1))).await;
    });
    product
}

impl PowerSeries {
    /// `U + V1 + V2 + …`.
    pub fn plus<I>(self, others: I) -> PowerSeries
    where
        I: IntoIterator<Item = PowerSeries>,
    {
        others.into_iter().fold(self, add)
    }

    /// `U − V`.
    pub fn minus(self, other: PowerSeries) -> PowerSeries {
        add(self, other.scale(Coefficient::minus_one()))
    }

    /// `U − V1 − V2 − …`.
    pub fn less<I>(self, others: I) -> PowerSeries
    where
        I: IntoIterator<Item = PowerSeries>,
    {
        others.into_iter().fold(self, PowerSeries::minus)
    }

    /// `U·V1·V2·…`.
    pub fn times<I>(self, others: I) -> PowerSeries
    where
        I: IntoIterator<Item = PowerSeries>,
    {
        others.into_iter().fold(self, multiply)
    }

    /// Term-wise `c·u`.
    pub fn scale(self, c: Coefficient) -> PowerSeries {
        self.map_terms("scale", move |_, u| u * &c)
    }

    /// `xⁿ·U`: `n` zeros followed by `U`.
    ///
    /// `n = 0` yields the empty series and releases `U`.
    pub fn monomial_multiply(self, n: usize) -> PowerSeries {
        let session = self.session().clone();
        let (mut out, series) = pipe(&session);
        session.spawn("monmul", async move {
            if n == 0 {
                return;
            }
            for _ in 0..n {
                let Some(req) = out.next_request().await else {
                    return;
                };
                req.respond(Coefficient::zero());
            }
            out.forward(self).await;
        });
        series
    }

    /// `x·U`.
    pub fn xmul(self) -> PowerSeries {
        self.monomial_multiply(1)
    }

    /// `c + x·U`: `c` followed by `U`.
    pub fn shift(self, c: Coefficient) -> PowerSeries {
        let session = self.session().clone();
        let (mut out, series) = pipe(&session);
        session.spawn("shift", async move {
            let Some(req) = out.next_request().await else {
                return;
            };
            if req.respond(c) {
                out.forward(self).await;
            }
        });
        series
    }
}

impl ops::Add for PowerSeries {
    type Output = PowerSeries;

    fn add(self, rhs: Self) -> Self::Output {
        add(self, rhs)
    }
}

impl ops::Sub for PowerSeries {
    type Output = PowerSeries;

    fn sub(self, rhs: Self) -> Self::Output {
        self.minus(rhs)
    }
}

impl ops::Mul for PowerSeries {
    type Output = PowerSeries;

    fn mul(self, rhs: Self) -> Self::Output {
        multiply(self, rhs)
    }
}

impl ops::Neg for PowerSeries {
    type Output = PowerSeries;

    fn neg(self) -> Self::Output {
        self.scale(Coefficient::minus_one())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, Session};

    fn ints(v: &[i64]) -> Vec<Coefficient> {
        v.iter().copied().map(Coefficient::from_integer).collect()
    }

    #[tokio::test]
    async fn test_add_constant_series() {
        let session = Session::new(Config::default());
        let mut sum = add(session.ones(), session.twos());
        assert_eq!(sum.pull_n(5).await.unwrap(), ints(&[3, 3, 3, 3, 3]));
    }

    #[tokio::test]
    async fn test_add_forwards_longer_input() {
        let session = Session::new(Config::default());
        let short = session.polynomial(ints(&[1, 1]));
        let long = session.polynomial(ints(&[1, 2, 3, 4]));
        assert_eq!((short + long).pull_all().await.unwrap(), ints(&[2, 3, 3, 4]));
    }

    #[tokio::test]
    async fn test_plus_less_minus() {
        let session = Session::new(Config::default());
        let mut s = session.ones().plus([session.twos(), session.ones()]);
        assert_eq!(s.pull_n(3).await.unwrap(), ints(&[4, 4, 4]));

        let mut d = session.twos().less([session.ones(), session.ones()]);
        assert_eq!(d.pull_n(3).await.unwrap(), ints(&[0, 0, 0]));

        let mut n = -session.ones() - session.twos();
        assert_eq!(n.pull_n(2).await.unwrap(), ints(&[-3, -3]));
    }

    #[tokio::test]
    async fn test_times_ones_counts_up() {
        let session = Session::new(Config::default());
        let mut p = session.ones().times([session.ones()]);
        assert_eq!(p.pull_n(5).await.unwrap(), ints(&[1, 2, 3, 4, 5]));
    }

    #[tokio::test]
    async fn test_multiply_polynomials() {
        // (1 + x)(1 − x + x²) = 1 + x³
        let session = Session::new(Config::default());
        let a = session.polynomial(ints(&[1, 1]));
        let b = session.polynomial(ints(&[1, -1, 1]));
        assert_eq!((a * b).pull_all().await.unwrap(), ints(&[1, 0, 0, 1]));

        let c = session.polynomial(ints(&[3]));
        let d = session.polynomial(ints(&[4]));
        assert_eq!((c * d).pull_all().await.unwrap(), ints(&[12]));
    }

    #[tokio::test]
    async fn test_multiply_by_empty_is_empty() {
        let session = Session::new(Config::default());
        let mut p = multiply(session.ones(), session.polynomial(Vec::new()));
        assert_eq!(p.pull().await, Ok(None));
    }

    #[tokio::test]
    async fn test_scale_shift_xmul() {
        let session = Session::new(Config::default());
        let mut s = session.ones().scale(Coefficient::new(1, 2));
        assert_eq!(s.pull_n(2).await.unwrap(), vec![Coefficient::new(1, 2); 2]);

        let mut sh = session.ones().shift(Coefficient::from_integer(7));
        assert_eq!(sh.pull_n(3).await.unwrap(), ints(&[7, 1, 1]));

        let mut xm = session.polynomial(ints(&[5, 6])).xmul();
        assert_eq!(xm.pull_all().await.unwrap(), ints(&[0, 5, 6]));

        let mut mm = session.polynomial(ints(&[5])).monomial_multiply(3);
        assert_eq!(mm.pull_all().await.unwrap(), ints(&[0, 0, 0, 5]));
    }

    #[tokio::test]
    async fn test_monomial_multiply_by_zero_count_is_empty() {
        let session = Session::new(Config::default());
        let mut s = session.ones().monomial_multiply(0);
        assert_eq!(s.pull().await, Ok(None));
        drop(s);
        session.join_idle().await.unwrap();
    }
}

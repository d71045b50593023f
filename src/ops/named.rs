//! Well-known series.

use crate::coefficient::Coefficient;
use crate::core::Session;
use crate::series::PowerSeries;

impl Session {
    /// `1, 1, 1, …` = `1/(1−x)`.
    pub fn ones(&self) -> PowerSeries {
        self.ad_infinitum(Coefficient::one())
    }

    /// `2, 2, 2, …`.
    pub fn twos(&self) -> PowerSeries {
        self.ad_infinitum(Coefficient::from_integer(2))
    }

    /// `0!, 1!, 2!, …` = `1, 1, 2, 6, 24, …`.
    pub fn factorials(&self) -> PowerSeries {
        let mut curr = Coefficient::one();
        let mut i = 0;
        self.generate("factorials", move || {
            let out = curr.clone();
            i += 1;
            curr = curr.clone() * Coefficient::from_index(i);
            Some(out)
        })
    }

    /// `1/i!` = the series of `eˣ`.
    pub fn one_by_factorial(&self) -> PowerSeries {
        let mut curr = Coefficient::one();
        let mut i = 0;
        self.generate("one_by_factorial", move || {
            let out = curr.clone();
            i += 1;
            curr = curr.clone() * Coefficient::unit_fraction(i);
            Some(out)
        })
    }

    /// `1, 2, 3, 5, 8, 13, …`.
    pub fn fibonaccis(&self) -> PowerSeries {
        let (mut curr, mut next) = (Coefficient::one(), Coefficient::from_integer(2));
        self.generate("fibonaccis", move || {
            let sum = &curr + &next;
            let out = std::mem::replace(&mut curr, std::mem::replace(&mut next, sum));
            Some(out)
        })
    }

    /// `1/1, 1/2, 1/3, 1/5, 1/8, …`.
    pub fn one_by_fibonacci(&self) -> PowerSeries {
        self.fibonaccis().map_terms("one_by_fibonacci", |_, c| {
            // fibonaccis are positive, so the inverse exists
            c.inv().unwrap_or_default()
        })
    }

    /// Partial sums of the harmonic series: `1, 3/2, 11/6, 25/12, …`.
    pub fn harmonics(&self) -> PowerSeries {
        let mut curr = Coefficient::one();
        let mut i = 1;
        self.generate("harmonics", move || {
            let out = curr.clone();
            i += 1;
            curr = curr.clone() + Coefficient::unit_fraction(i);
            Some(out)
        })
    }

    /// Sine and cosine (in radians) from one split of [`Session::one_by_factorial`].
    pub fn sincos(&self) -> (PowerSeries, PowerSeries) {
        let (s, c) = self.one_by_factorial().split();
        let sin = s.map_terms("sin", |i, u| alternate(i, u, 1));
        let cos = c.map_terms("cos", |i, u| alternate(i, u, 0));
        (sin, cos)
    }

    /// `x − x³/3! + x⁵/5! − …`.
    pub fn sin(&self) -> PowerSeries {
        self.sincos().0
    }

    /// `1 − x²/2! + x⁴/4! − …`.
    pub fn cos(&self) -> PowerSeries {
        self.sincos().1
    }
}

/// Keeps terms whose index has the given parity, with alternating signs.
fn alternate(i: u64, u: Coefficient, parity: u64) -> Coefficient {
    if i % 2 != parity {
        Coefficient::zero()
    } else if (i / 2) % 2 == 0 {
        u
    } else {
        -u
    }
}

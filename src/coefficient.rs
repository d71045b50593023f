//! Exact rational coefficients.
//!
//! [`Coefficient`] wraps an arbitrary precision [`RBig`]. Values are always kept
//! in lowest terms with a positive denominator, so equality is structural.
//!
//! Coefficients are immutable: every operation yields a new value, which makes
//! them safe to hand across task boundaries and to share between both sides of
//! a split.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use dashu::base::Inverse;
use dashu::integer::{IBig, UBig};
use dashu::rational::RBig;
use num_traits::{One, Zero};

/// An exact rational coefficient of a power series.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coefficient(RBig);

impl Coefficient {
    /// Creates a coefficient `num/den`, reduced to lowest terms.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    #[must_use]
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "denominator cannot be zero");
        let num = if den < 0 { -IBig::from(num) } else { IBig::from(num) };
        Self(RBig::from_parts(num, UBig::from(den.unsigned_abs())))
    }

    /// Creates an integer coefficient.
    #[must_use]
    pub fn from_integer(n: i64) -> Self {
        Self(RBig::from(IBig::from(n)))
    }

    /// The additive identity.
    #[must_use]
    pub fn zero() -> Self {
        Self(RBig::ZERO)
    }

    /// The multiplicative identity.
    #[must_use]
    pub fn one() -> Self {
        Self(RBig::ONE)
    }

    /// `-1`.
    #[must_use]
    pub fn minus_one() -> Self {
        Self(RBig::NEG_ONE)
    }

    /// `1/n` for a term position `n >= 1`.
    pub(crate) fn unit_fraction(n: u64) -> Self {
        Self(RBig::from_parts(IBig::ONE, UBig::from(n)))
    }

    /// `n` for a term position.
    pub(crate) fn from_index(n: u64) -> Self {
        Self(RBig::from(UBig::from(n)))
    }

    /// Returns true for the additive identity.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true for the multiplicative identity.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.0 == RBig::ONE
    }

    /// Returns the reciprocal, or `None` for zero.
    #[must_use]
    pub fn inv(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(Self(self.0.clone().inv()))
        }
    }

    /// Raises to a non-negative integer power.
    #[must_use]
    pub fn pow(&self, exp: usize) -> Self {
        Self(self.0.pow(exp))
    }

    /// Nearest `f64` (rounded).
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().value()
    }

    /// Returns the inner `dashu::RBig`.
    #[must_use]
    pub fn into_inner(self) -> RBig {
        self.0
    }

    /// Returns a reference to the inner `dashu::RBig`.
    #[must_use]
    pub fn as_inner(&self) -> &RBig {
        &self.0
    }
}

impl From<i64> for Coefficient {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<RBig> for Coefficient {
    fn from(value: RBig) -> Self {
        Self(value)
    }
}

impl Zero for Coefficient {
    fn zero() -> Self {
        Coefficient::zero()
    }

    fn is_zero(&self) -> bool {
        Coefficient::is_zero(self)
    }
}

impl One for Coefficient {
    fn one() -> Self {
        Coefficient::one()
    }
}

impl fmt::Debug for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coefficient({})", self.0)
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Coefficient {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Add<&Coefficient> for Coefficient {
    type Output = Self;

    fn add(self, rhs: &Coefficient) -> Self::Output {
        Self(self.0 + &rhs.0)
    }
}

impl Add for &Coefficient {
    type Output = Coefficient;

    fn add(self, rhs: Self) -> Self::Output {
        Coefficient(&self.0 + &rhs.0)
    }
}

impl Sub for Coefficient {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub for &Coefficient {
    type Output = Coefficient;

    fn sub(self, rhs: Self) -> Self::Output {
        Coefficient(&self.0 - &rhs.0)
    }
}

impl Mul for Coefficient {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Mul<&Coefficient> for Coefficient {
    type Output = Self;

    fn mul(self, rhs: &Coefficient) -> Self::Output {
        Self(self.0 * &rhs.0)
    }
}

impl Mul for &Coefficient {
    type Output = Coefficient;

    fn mul(self, rhs: Self) -> Self::Output {
        Coefficient(&self.0 * &rhs.0)
    }
}

impl Div for Coefficient {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self(self.0 / rhs.0)
    }
}

impl Neg for Coefficient {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Neg for &Coefficient {
    type Output = Coefficient;

    fn neg(self) -> Self::Output {
        Coefficient(-self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> Coefficient {
        Coefficient::new(n, d)
    }

    #[test]
    fn test_reduced_on_construction() {
        assert_eq!(q(2, 4), q(1, 2));
        assert_eq!(q(3, -6), q(-1, 2));
        assert_eq!(q(-3, -6), q(1, 2));
        assert_eq!(q(0, 7), Coefficient::zero());
    }

    #[test]
    fn test_field_laws() {
        // 2/3 + 3/4 = 17/12
        assert_eq!(&q(2, 3) + &q(3, 4), q(17, 12));
        // 2/3 * 3/4 = 1/2
        assert_eq!(&q(2, 3) * &q(3, 4), q(1, 2));
        assert_eq!(&q(1, 2) - &q(1, 3), q(1, 6));
        assert_eq!(-q(1, 2), q(-1, 2));
    }

    #[test]
    fn test_inverse() {
        let a = q(3, 5);
        let inv = a.inv().unwrap();
        assert!((a * inv).is_one());
        assert!(Coefficient::zero().inv().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(q(6, 3).to_string(), "2");
        assert_eq!(q(-1, 3).to_string(), "-1/3");
    }

    #[test]
    fn test_helpers() {
        assert_eq!(Coefficient::unit_fraction(4), q(1, 4));
        assert_eq!(Coefficient::from_index(5), q(5, 1));
        assert_eq!(q(-2, 3).pow(3), q(-8, 27));
        assert_eq!(q(1, 4).to_f64(), 0.25);
    }

    #[test]
    #[should_panic(expected = "denominator cannot be zero")]
    fn test_zero_denominator_panics() {
        let _ = q(1, 0);
    }
}

//! Exact rational numbers used for dimension exponents.
//!
//! Exponents have to cancel exactly after repeated fractional powers
//! (`(L^1/2)^2 == L`), so they are never stored as floats.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Largest denominator accepted when approximating a float exponent.
const MAX_APPROX_DENOMINATOR: i64 = 10_000;

/// A reduced fraction `num/den` with `den > 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rational {
    num: i64,
    den: i64,
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Rational {
    pub const ZERO: Self = Self::integer(0);
    pub const ONE: Self = Self::integer(1);

    pub const fn integer(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    /// Build a reduced fraction.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    pub fn new(num: i64, den: i64) -> Self {
        Self::checked_new(num, den)
            .unwrap_or_else(|| panic!("rational {num}/{den} has a zero denominator"))
    }

    pub fn checked_new(num: i64, den: i64) -> Option<Self> {
        Self::from_wide(num as i128, den as i128)
    }

    fn from_wide(num: i128, den: i128) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let g = gcd(num, den).max(1);
        let sign = if den < 0 { -1 } else { 1 };
        Some(Self {
            num: i64::try_from(sign * num / g).ok()?,
            den: i64::try_from(sign * den / g).ok()?,
        })
    }

    fn from_wide_or_panic(num: i128, den: i128) -> Self {
        Self::from_wide(num, den).unwrap_or_else(|| panic!("rational exponent overflow"))
    }

    /// `None` when the reduced sum does not fit in `i64`.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Self::from_wide(
            self.num as i128 * rhs.den as i128 + rhs.num as i128 * self.den as i128,
            self.den as i128 * rhs.den as i128,
        )
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.checked_add(rhs.checked_neg()?)
    }

    /// `None` when the reduced product does not fit in `i64`.
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        Self::from_wide(
            self.num as i128 * rhs.num as i128,
            self.den as i128 * rhs.den as i128,
        )
    }

    pub fn checked_neg(self) -> Option<Self> {
        Some(Self {
            num: self.num.checked_neg()?,
            den: self.den,
        })
    }

    pub const fn numer(&self) -> i64 {
        self.num
    }

    pub const fn denom(&self) -> i64 {
        self.den
    }

    pub const fn is_zero(&self) -> bool {
        self.num == 0
    }

    pub const fn is_integer(&self) -> bool {
        self.den == 1
    }

    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    pub fn recip(&self) -> Option<Self> {
        Self::checked_new(self.den, self.num)
    }

    /// Closest fraction to `value` with a denominator of at most 10000,
    /// found by walking the continued fraction expansion.
    pub fn approximate(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let (mut h0, mut h1): (i128, i128) = (0, 1);
        let (mut k0, mut k1): (i128, i128) = (1, 0);
        let mut x = value;
        loop {
            let a = x.floor();
            if a.abs() > i64::MAX as f64 {
                return None;
            }
            let a = a as i128;
            let h2 = a * h1 + h0;
            let k2 = a * k1 + k0;
            if k2 > MAX_APPROX_DENOMINATOR as i128 {
                break;
            }
            (h0, h1, k0, k1) = (h1, h2, k1, k2);
            let frac = x - a as f64;
            if frac.abs() < 1e-12 || ((h1 as f64 / k1 as f64) - value).abs() < 1e-12 {
                break;
            }
            x = 1.0 / frac;
        }
        Self::from_wide(h1, k1)
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::integer(n)
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Self::integer(n as i64)
    }
}

impl TryFrom<f64> for Rational {
    type Error = ParseError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::approximate(value).ok_or_else(|| ParseError::InvalidNumber(value.to_string()))
    }
}

/// # Panics
///
/// Panics if the result does not fit in `i64`; see [`Rational::checked_add`].
impl Add for Rational {
    type Output = Rational;
    fn add(self, rhs: Self) -> Self::Output {
        Self::from_wide_or_panic(
            self.num as i128 * rhs.den as i128 + rhs.num as i128 * self.den as i128,
            self.den as i128 * rhs.den as i128,
        )
    }
}

impl Sub for Rational {
    type Output = Rational;
    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

/// # Panics
///
/// Panics if the result does not fit in `i64`; see [`Rational::checked_mul`].
impl Mul for Rational {
    type Output = Rational;
    fn mul(self, rhs: Self) -> Self::Output {
        Self::from_wide_or_panic(
            self.num as i128 * rhs.num as i128,
            self.den as i128 * rhs.den as i128,
        )
    }
}

impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Self::Output {
        Self {
            num: -self.num,
            den: self.den,
        }
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.num as i128 * other.den as i128).cmp(&(other.num as i128 * self.den as i128))
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl FromStr for Rational {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ParseError::InvalidNumber(s.to_string());
        if let Some((num, den)) = s.split_once('/') {
            let num: i64 = num.trim().parse().map_err(|_| invalid())?;
            let den: i64 = den.trim().parse().map_err(|_| invalid())?;
            return Self::checked_new(num, den).ok_or_else(|| ParseError::ZeroDenominator(s.into()));
        }
        if let Ok(n) = s.parse::<i64>() {
            return Ok(Self::integer(n));
        }
        let value: f64 = s.parse().map_err(|_| invalid())?;
        Self::try_from(value)
    }
}

impl From<Rational> for String {
    fn from(r: Rational) -> String {
        r.to_string()
    }
}

impl TryFrom<String> for Rational {
    type Error = ParseError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduces_and_normalizes_sign() {
        let r = Rational::new(4, -8);
        assert_eq!(r.numer(), -1);
        assert_eq!(r.denom(), 2);
        assert_eq!(r.to_string(), "-1/2");
    }

    #[test]
    fn test_thirds_sum_exactly_to_one() {
        let third = Rational::new(1, 3);
        assert_eq!(third + third + third, Rational::ONE);
    }

    #[test]
    fn test_approximate_common_floats() {
        assert_eq!(Rational::approximate(0.5), Some(Rational::new(1, 2)));
        assert_eq!(Rational::approximate(-1.5), Some(Rational::new(-3, 2)));
        assert_eq!(Rational::approximate(1.0 / 3.0), Some(Rational::new(1, 3)));
        assert_eq!(Rational::approximate(2.0), Some(Rational::integer(2)));
        assert_eq!(Rational::approximate(f64::NAN), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("3".parse::<Rational>().unwrap(), Rational::integer(3));
        assert_eq!("-2/6".parse::<Rational>().unwrap(), Rational::new(-1, 3));
        assert_eq!("0.25".parse::<Rational>().unwrap(), Rational::new(1, 4));
        assert!(matches!(
            "1/0".parse::<Rational>(),
            Err(ParseError::ZeroDenominator(_))
        ));
        assert!("abc".parse::<Rational>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(Rational::new(1, 3) < Rational::new(1, 2));
        assert!(Rational::new(-1, 2) < Rational::ZERO);
    }

    #[test]
    fn test_checked_arithmetic() {
        let big = Rational::integer(i64::MAX);
        assert_eq!(big.checked_mul(Rational::new(1, 2)), Some(Rational::new(i64::MAX, 2)));
        assert_eq!(big.checked_mul(Rational::integer(2)), None);
        assert_eq!(big.checked_add(Rational::ONE), None);
        assert_eq!(big.checked_sub(Rational::ONE), Some(Rational::integer(i64::MAX - 1)));
        assert_eq!(Rational::integer(i64::MIN).checked_neg(), None);
    }

    #[test]
    fn test_recip() {
        assert_eq!(Rational::new(2, 3).recip(), Some(Rational::new(3, 2)));
        assert_eq!(Rational::ZERO.recip(), None);
    }
}

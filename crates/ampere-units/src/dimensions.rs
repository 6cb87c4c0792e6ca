use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, QuantityError};
use crate::rational::Rational;

/// The seven SI base dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseDimension {
    Length,
    Mass,
    Time,
    Current,
    Temperature,
    Substance,
    LuminousIntensity,
}

impl BaseDimension {
    pub const ALL: [BaseDimension; 7] = [
        BaseDimension::Length,
        BaseDimension::Mass,
        BaseDimension::Time,
        BaseDimension::Current,
        BaseDimension::Temperature,
        BaseDimension::Substance,
        BaseDimension::LuminousIntensity,
    ];

    pub const fn symbol(&self) -> &'static str {
        match self {
            BaseDimension::Length => "L",
            BaseDimension::Mass => "M",
            BaseDimension::Time => "T",
            BaseDimension::Current => "I",
            BaseDimension::Temperature => "Θ",
            BaseDimension::Substance => "N",
            BaseDimension::LuminousIntensity => "J",
        }
    }

    /// Symbol of the SI base unit measuring this dimension.
    pub const fn si_unit(&self) -> &'static str {
        match self {
            BaseDimension::Length => "m",
            BaseDimension::Mass => "kg",
            BaseDimension::Time => "s",
            BaseDimension::Current => "A",
            BaseDimension::Temperature => "K",
            BaseDimension::Substance => "mol",
            BaseDimension::LuminousIntensity => "cd",
        }
    }
}

impl fmt::Display for BaseDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for BaseDimension {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BaseDimension::ALL
            .into_iter()
            .find(|d| d.symbol() == s)
            .ok_or_else(|| ParseError::InvalidDimension(s.to_string()))
    }
}

/// Exponent vector over the base dimensions.
///
/// Zero exponents are never stored, so equality is plain map equality and
/// two vectors describing the same dimension always compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Dimensions {
    exponents: BTreeMap<BaseDimension, Rational>,
}

impl Dimensions {
    pub const DIMENSIONLESS: Self = Self {
        exponents: BTreeMap::new(),
    };

    pub const fn new() -> Self {
        Self::DIMENSIONLESS
    }

    /// A single base dimension raised to the first power.
    pub fn base(dim: BaseDimension) -> Self {
        Self::new().with(dim, 1)
    }

    /// Builder form of [`Dimensions::set`].
    pub fn with(mut self, dim: BaseDimension, exponent: impl Into<Rational>) -> Self {
        self.set(dim, exponent.into());
        self
    }

    pub fn set(&mut self, dim: BaseDimension, exponent: Rational) {
        if exponent.is_zero() {
            self.exponents.remove(&dim);
        } else {
            self.exponents.insert(dim, exponent);
        }
    }

    pub fn exponent(&self, dim: BaseDimension) -> Rational {
        self.exponents.get(&dim).copied().unwrap_or(Rational::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BaseDimension, Rational)> + '_ {
        self.exponents.iter().map(|(dim, exp)| (*dim, *exp))
    }

    pub fn multiply(&self, other: &Dimensions) -> Dimensions {
        self.combine(other, |a, b| a + b)
    }

    pub fn divide(&self, other: &Dimensions) -> Dimensions {
        self.combine(other, |a, b| a - b)
    }

    /// Scale every exponent by `exponent`.
    ///
    /// # Panics
    ///
    /// Panics if an exponent overflows `i64`. Use [`Dimensions::checked_power`]
    /// for exponents that are not known to be small.
    pub fn power(&self, exponent: impl Into<Rational>) -> Dimensions {
        let exponent = exponent.into();
        let mut result = Dimensions::new();
        for (dim, exp) in self.iter() {
            result.set(dim, exp * exponent);
        }
        result
    }

    pub fn checked_power(&self, exponent: impl Into<Rational>) -> Result<Dimensions, QuantityError> {
        let exponent = exponent.into();
        let mut result = Dimensions::new();
        for (dim, exp) in self.iter() {
            let scaled = exp
                .checked_mul(exponent)
                .ok_or_else(|| QuantityError::ExponentOverflow(format!("({self})^{exponent}")))?;
            result.set(dim, scaled);
        }
        Ok(result)
    }

    pub fn reciprocal(&self) -> Dimensions {
        self.power(-1)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents.values().all(Rational::is_zero)
    }

    fn combine(&self, other: &Dimensions, op: impl Fn(Rational, Rational) -> Rational) -> Dimensions {
        let mut result = self.clone();
        for (dim, exp) in other.iter() {
            result.set(dim, op(self.exponent(dim), exp));
        }
        result
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponents.is_empty() {
            return f.write_str("dimensionless");
        }
        let joined = self
            .iter()
            .map(|(dim, exp)| {
                if exp == Rational::ONE {
                    dim.symbol().to_string()
                } else {
                    format!("{}^{}", dim.symbol(), exp)
                }
            })
            .join("*");
        f.write_str(&joined)
    }
}

impl FromStr for Dimensions {
    type Err = ParseError;

    /// Parses the [`Display`](fmt::Display) form, e.g. `L^2*M*T^-3` or `L^1/2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut dims = Dimensions::new();
        if s.is_empty() || s == "dimensionless" {
            return Ok(dims);
        }
        for token in s.split('*').map(str::trim) {
            let (symbol, exponent) = match token.split_once('^') {
                Some((symbol, exp)) => (symbol.trim(), exp.parse::<Rational>()?),
                None => (token, Rational::ONE),
            };
            let dim: BaseDimension = symbol.parse()?;
            dims.set(dim, dims.exponent(dim) + exponent);
        }
        Ok(dims)
    }
}

impl From<Dimensions> for String {
    fn from(dims: Dimensions) -> String {
        dims.to_string()
    }
}

impl TryFrom<String> for Dimensions {
    type Error = ParseError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BaseDimension> for Dimensions {
    fn from(dim: BaseDimension) -> Self {
        Dimensions::base(dim)
    }
}

#[cfg(test)]
mod tests {
    use super::BaseDimension::*;
    use super::*;

    fn velocity() -> Dimensions {
        Dimensions::new().with(Length, 1).with(Time, -1)
    }

    #[test]
    fn test_multiply_adds_exponents_and_drops_zeros() {
        let result = velocity().multiply(&Dimensions::base(Time));
        assert_eq!(result, Dimensions::base(Length));
        assert_eq!(result.exponent(Time), Rational::ZERO);
        assert_eq!(result.iter().count(), 1);
    }

    #[test]
    fn test_divide_subtracts_exponents() {
        let accel = velocity().divide(&Dimensions::base(Time));
        assert_eq!(accel.exponent(Time), Rational::integer(-2));
        assert_eq!(accel.to_string(), "L*T^-2");
        assert!(velocity().divide(&velocity()).is_dimensionless());
    }

    #[test]
    fn test_square_root_cancels_exactly() {
        let energy = Dimensions::new()
            .with(Mass, 1)
            .with(Length, 2)
            .with(Time, -2);
        let root = energy.power(Rational::new(1, 2));
        assert_eq!(root.to_string(), "L*M^1/2*T^-1");
        assert_eq!(root.power(2), energy);
        assert_eq!(root.multiply(&root), energy);
    }

    #[test]
    fn test_checked_power_reports_overflow() {
        let d = Dimensions::new().with(Length, 2);
        assert_eq!(d.checked_power(Rational::new(1, 2)).unwrap(), Dimensions::base(Length));
        assert!(matches!(
            d.checked_power(i64::MAX),
            Err(QuantityError::ExponentOverflow(_))
        ));
    }

    #[test]
    fn test_cube_roots_cancel_exactly() {
        let third = Dimensions::new().with(Time, Rational::new(1, 3));
        let whole = third.multiply(&third).multiply(&third);
        assert_eq!(whole, Dimensions::base(Time));
        assert_eq!(whole.exponent(Time).denom(), 1);
    }

    #[test]
    fn test_fracture_toughness_dimensions() {
        let stress = Dimensions::new()
            .with(Mass, 1)
            .with(Length, -1)
            .with(Time, -2);
        let sqrt_length = Dimensions::new().with(Length, Rational::new(1, 2));
        let k = stress.multiply(&sqrt_length);
        assert_eq!(k.to_string(), "L^-1/2*M*T^-2");
    }

    #[test]
    fn test_mixed_exponents_cancel_to_dimensionless() {
        let current = Dimensions::base(Current);
        let half = Dimensions::new().with(Current, Rational::new(1, 2));
        let three_halves = Dimensions::new().with(Current, Rational::new(3, 2));
        let result = current.multiply(&half).divide(&three_halves);
        assert!(result.is_dimensionless());
        assert_eq!(result, Dimensions::DIMENSIONLESS);
        assert_eq!(result.to_string(), "dimensionless");
    }

    #[test]
    fn test_parse_round_trip() {
        let dims: Dimensions = "L^2*M*T^-3*I^-1".parse().unwrap();
        assert_eq!(dims.exponent(Current), Rational::integer(-1));
        assert_eq!(dims.to_string().parse::<Dimensions>().unwrap(), dims);
        assert_eq!(
            "Θ*M^-1/2".parse::<Dimensions>().unwrap().to_string(),
            "M^-1/2*Θ"
        );
        assert!(matches!(
            "X^2".parse::<Dimensions>(),
            Err(ParseError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_serde_uses_display_form() {
        let json = serde_json::to_string(&velocity()).unwrap();
        assert_eq!(json, "\"L*T^-1\"");
        let back: Dimensions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, velocity());
    }
}

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::catalog;
use crate::dimensions::Dimensions;
use crate::error::QuantityError;
use crate::kind::QuantityKind;
use crate::rational::Rational;

/// A named unit of measurement and the dimensions it measures.
///
/// Units are compared structurally by symbol and dimensions; the display
/// name is informational. Composite units built by [`Unit::multiply`] and
/// [`Unit::divide`] are not interned.
///
/// A unit may know its scale: the factor that takes a value in this unit to
/// the coherent SI unit of the same dimensions (`mA` is `1e-3`, `V` is `1`).
/// Catalog units always know it and composites inherit it from their parts,
/// which is what lets `V*mA` convert to `W`.
#[derive(Clone, Debug)]
pub struct Unit {
    name: String,
    symbol: String,
    dimensions: Dimensions,
    scale: Option<f64>,
}

impl Unit {
    /// A unit with no known scale. Only the conversion tables can convert it.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, dimensions: Dimensions) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            dimensions,
            scale: None,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn dimensionless() -> Self {
        Self::new("dimensionless", "1", Dimensions::DIMENSIONLESS).with_scale(1.0)
    }

    /// Resolve a catalog unit of `kind` by its symbol.
    pub fn lookup(kind: QuantityKind, symbol: &str) -> Option<Unit> {
        let dimensions = kind.dimensions()?;
        catalog::find(kind, symbol)
            .map(|entry| Unit::new(entry.name, entry.symbol, dimensions).with_scale(entry.factor.scale()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    pub fn multiply(&self, other: &Unit) -> Unit {
        Unit {
            name: format!("{}*{}", self.name, other.name),
            symbol: format!("{}*{}", self.symbol, other.symbol),
            dimensions: self.dimensions.multiply(&other.dimensions),
            scale: self.scale.zip(other.scale).map(|(a, b)| a * b),
        }
    }

    pub fn divide(&self, other: &Unit) -> Unit {
        Unit {
            name: format!("{}/{}", self.name, other.name),
            symbol: format!("{}/{}", self.symbol, other.symbol),
            dimensions: self.dimensions.divide(&other.dimensions),
            scale: self.scale.zip(other.scale).map(|(a, b)| a / b),
        }
    }

    /// Fails only when an exponent of the result overflows.
    pub fn power(&self, exponent: impl Into<Rational>) -> Result<Unit, QuantityError> {
        let exponent = exponent.into();
        if exponent == Rational::ONE {
            return Ok(self.clone());
        }
        Ok(Unit {
            name: format!("({})^{}", self.name, exponent),
            symbol: format!("({})^{}", self.symbol, exponent),
            dimensions: self.dimensions.checked_power(exponent)?,
            scale: self.scale.map(|s| s.powf(exponent.to_f64())),
        })
    }

    /// Two units are compatible when they measure the same dimensions.
    pub fn is_compatible_with(&self, other: &Unit) -> bool {
        self.dimensions == other.dimensions
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dimensions.is_dimensionless()
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.dimensions == other.dimensions
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
        self.dimensions.hash(state);
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

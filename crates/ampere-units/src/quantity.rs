use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::conversion::ConversionRegistry;
use crate::error::QuantityError;
use crate::kind::QuantityKind;
use crate::rational::Rational;
use crate::record::QuantityRecord;
use crate::unit::Unit;

/// A numeric value tagged with its unit and quantity kind.
///
/// Addition, subtraction and comparison require both sides to be the same
/// kind and convert the right-hand side into the left-hand unit first.
/// Multiplication and division accept any two quantities; the kind of the
/// result follows from its dimensions.
///
/// Methods without a registry argument convert through
/// [`ConversionRegistry::builtin`]; the `*_in` variants take one explicitly.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "QuantityRecord", try_from = "QuantityRecord")]
pub struct Quantity {
    kind: QuantityKind,
    value: f64,
    unit: Unit,
}

macro_rules! kind_constructors {
    ($($(#[$meta:meta])* $fn_name:ident => $kind:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $fn_name(value: f64) -> Self {
                Self::of(QuantityKind::$kind, value)
            }
        )*
    };
}

impl Quantity {
    /// Build a quantity, checking that `unit` measures `kind`.
    pub fn new(kind: QuantityKind, value: f64, unit: Unit) -> Result<Self, QuantityError> {
        if let Some(dims) = kind.dimensions() {
            if &dims != unit.dimensions() {
                return Err(QuantityError::IncompatibleUnits {
                    lhs: kind.default_symbol().to_string(),
                    rhs: unit.symbol().to_string(),
                });
            }
        }
        Ok(Self { kind, value, unit })
    }

    /// A quantity of `kind` expressed in the kind's default unit.
    pub fn of(kind: QuantityKind, value: f64) -> Self {
        Self {
            kind,
            value,
            unit: kind.default_unit(),
        }
    }

    /// A quantity of `kind` in the catalog unit named by `symbol`.
    pub fn in_unit(kind: QuantityKind, value: f64, symbol: &str) -> Result<Self, QuantityError> {
        let unit =
            Unit::lookup(kind, symbol).ok_or_else(|| QuantityError::unknown_unit(kind.key(), symbol))?;
        Ok(Self { kind, value, unit })
    }

    kind_constructors! {
        dimensionless => Dimensionless,
        length => Length,
        mass => Mass,
        time => Time,
        /// Kelvin.
        temperature => Temperature,
        current => Current,
        substance => Substance,
        luminous_intensity => LuminousIntensity,
        voltage => Voltage,
        power => Power,
        energy => Energy,
        charge => Charge,
        frequency => Frequency,
        resistance => Resistance,
        /// Degrees.
        angle => Angle,
        area => Area,
        volume => Volume,
        force => Force,
        pressure => Pressure,
        speed => Speed,
        mass_flow_rate => MassFlowRate,
        thermal_resistance => ThermalResistance,
        thermal_conductivity => ThermalConductivity,
    }

    pub fn kind(&self) -> QuantityKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Same kind and unit, different value.
    pub fn with_value(&self, value: f64) -> Self {
        Self {
            kind: self.kind,
            value,
            unit: self.unit.clone(),
        }
    }

    pub fn convert_to(&self, target: &Unit) -> Result<Quantity, QuantityError> {
        self.convert_to_in(target, ConversionRegistry::builtin())
    }

    /// Symbols in the kind's table convert through the table. Any other
    /// unit, such as the `V*mA` left by [`Quantity::multiply`], goes through
    /// the kind's base unit using [`Unit::scale`].
    pub fn convert_to_in(
        &self,
        target: &Unit,
        registry: &ConversionRegistry,
    ) -> Result<Quantity, QuantityError> {
        if &self.unit == target {
            return Ok(self.clone());
        }
        if !self.unit.is_compatible_with(target) {
            return Err(self.incompatible(target));
        }
        let value = if self.kind == QuantityKind::Derived {
            self.value * self.scale_of(&self.unit)? / self.scale_of(target)?
        } else {
            let manager = registry.manager(self.kind)?;
            let (from, to) = (self.unit.symbol(), target.symbol());
            let table = manager.table();
            if table.contains(from) && table.contains(to) {
                manager.convert(self.value, from, to)?
            } else {
                let base = self.kind.base_symbol();
                let in_base = if table.contains(from) {
                    manager.convert(self.value, from, base)?
                } else {
                    self.value * self.scale_of(&self.unit)?
                };
                if table.contains(to) {
                    manager.convert(in_base, base, to)?
                } else {
                    in_base / self.scale_of(target)?
                }
            }
        };
        Ok(Self {
            kind: self.kind,
            value,
            unit: target.clone(),
        })
    }

    /// Convert to the catalog unit of this kind named by `symbol`.
    pub fn convert_to_symbol(&self, symbol: &str) -> Result<Quantity, QuantityError> {
        let target = Unit::lookup(self.kind, symbol)
            .ok_or_else(|| QuantityError::unknown_unit(self.kind.key(), symbol))?;
        self.convert_to(&target)
    }

    /// Numeric value of this quantity expressed in `symbol`.
    pub fn value_in(&self, symbol: &str) -> Result<f64, QuantityError> {
        Ok(self.convert_to_symbol(symbol)?.value)
    }

    pub fn add(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        self.add_in(other, ConversionRegistry::builtin())
    }

    pub fn add_in(
        &self,
        other: &Quantity,
        registry: &ConversionRegistry,
    ) -> Result<Quantity, QuantityError> {
        let rhs = self.coerce(other, registry)?;
        Ok(self.with_value(self.value + rhs))
    }

    pub fn subtract(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        self.subtract_in(other, ConversionRegistry::builtin())
    }

    pub fn subtract_in(
        &self,
        other: &Quantity,
        registry: &ConversionRegistry,
    ) -> Result<Quantity, QuantityError> {
        let rhs = self.coerce(other, registry)?;
        Ok(self.with_value(self.value - rhs))
    }

    pub fn multiply(&self, other: &Quantity) -> Quantity {
        let unit = self.unit.multiply(&other.unit);
        Self {
            kind: QuantityKind::from_dimensions(unit.dimensions()),
            value: self.value * other.value,
            unit,
        }
    }

    pub fn divide(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        if other.value == 0.0 {
            return Err(QuantityError::DivisionByZero);
        }
        let unit = self.unit.divide(&other.unit);
        Ok(Self {
            kind: QuantityKind::from_dimensions(unit.dimensions()),
            value: self.value / other.value,
            unit,
        })
    }

    /// Multiply by a plain number, keeping kind and unit.
    pub fn scale(&self, factor: f64) -> Quantity {
        self.with_value(self.value * factor)
    }

    /// Raise value and unit to `exponent`, e.g. `1/2` for a square root.
    pub fn pow(&self, exponent: impl Into<Rational>) -> Result<Quantity, QuantityError> {
        let exponent = exponent.into();
        let unit = self.unit.power(exponent)?;
        Ok(Self {
            kind: QuantityKind::from_dimensions(unit.dimensions()),
            value: self.value.powf(exponent.to_f64()),
            unit,
        })
    }

    pub fn compare_to(&self, other: &Quantity) -> Result<Ordering, QuantityError> {
        self.compare_to_in(other, ConversionRegistry::builtin())
    }

    pub fn compare_to_in(
        &self,
        other: &Quantity,
        registry: &ConversionRegistry,
    ) -> Result<Ordering, QuantityError> {
        let rhs = self.coerce(other, registry)?;
        Ok(self.value.total_cmp(&rhs))
    }

    pub fn equals(&self, other: &Quantity) -> Result<bool, QuantityError> {
        Ok(self.compare_to(other)? == Ordering::Equal)
    }

    pub fn less_than(&self, other: &Quantity) -> Result<bool, QuantityError> {
        Ok(self.compare_to(other)? == Ordering::Less)
    }

    pub fn greater_than(&self, other: &Quantity) -> Result<bool, QuantityError> {
        Ok(self.compare_to(other)? == Ordering::Greater)
    }

    /// Equal within a relative tolerance after converting `other` into this unit.
    pub fn approx_eq(&self, other: &Quantity, rel_tol: f64) -> Result<bool, QuantityError> {
        let rhs = self.coerce(other, ConversionRegistry::builtin())?;
        let scale = self.value.abs().max(rhs.abs()).max(f64::MIN_POSITIVE);
        Ok((self.value - rhs).abs() <= rel_tol * scale)
    }

    pub fn to_record(&self) -> QuantityRecord {
        QuantityRecord::from(self.clone())
    }

    pub fn from_record(record: QuantityRecord) -> Result<Self, QuantityError> {
        Self::try_from(record)
    }

    /// Value of `other` expressed in this unit, after kind and unit checks.
    fn coerce(&self, other: &Quantity, registry: &ConversionRegistry) -> Result<f64, QuantityError> {
        if self.kind != other.kind {
            return Err(QuantityError::IncompatibleQuantityKind {
                expected: self.kind,
                actual: other.kind,
            });
        }
        if !self.unit.is_compatible_with(&other.unit) {
            return Err(other.incompatible(&self.unit));
        }
        Ok(other.convert_to_in(&self.unit, registry)?.value)
    }

    fn scale_of(&self, unit: &Unit) -> Result<f64, QuantityError> {
        unit.scale()
            .ok_or_else(|| QuantityError::unknown_unit(self.kind.key(), unit.symbol()))
    }

    fn incompatible(&self, target: &Unit) -> QuantityError {
        QuantityError::IncompatibleUnits {
            lhs: format!("{} [{}]", self.unit, self.unit.dimensions()),
            rhs: format!("{} [{}]", target, target.dimensions()),
        }
    }

    pub(crate) fn from_parts(kind: QuantityKind, value: f64, unit: Unit) -> Self {
        Self { kind, value, unit }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

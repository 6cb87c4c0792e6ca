//! Registry of quantity kinds.
//!
//! A kind ties together a canonical dimension vector, a default unit and the
//! key under which its conversion table is looked up.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dimensions::{BaseDimension::*, Dimensions};
use crate::error::ParseError;
use crate::unit::Unit;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    Dimensionless,
    Length,
    Mass,
    Time,
    Temperature,
    #[serde(rename = "electric_current")]
    Current,
    #[serde(rename = "amount_of_substance")]
    Substance,
    LuminousIntensity,
    Voltage,
    Power,
    Energy,
    #[serde(rename = "electric_charge")]
    Charge,
    Frequency,
    Resistance,
    Angle,
    Area,
    Volume,
    Force,
    Pressure,
    Speed,
    MassFlowRate,
    ThermalResistance,
    ThermalConductivity,
    /// Result of arithmetic whose dimensions match no registered kind.
    Derived,
}

impl QuantityKind {
    /// Registered kinds in lookup order. `Derived` is not registered.
    pub const REGISTERED: [QuantityKind; 23] = [
        QuantityKind::Dimensionless,
        QuantityKind::Length,
        QuantityKind::Mass,
        QuantityKind::Time,
        QuantityKind::Temperature,
        QuantityKind::Current,
        QuantityKind::Substance,
        QuantityKind::LuminousIntensity,
        QuantityKind::Voltage,
        QuantityKind::Power,
        QuantityKind::Energy,
        QuantityKind::Charge,
        QuantityKind::Frequency,
        QuantityKind::Resistance,
        QuantityKind::Angle,
        QuantityKind::Area,
        QuantityKind::Volume,
        QuantityKind::Force,
        QuantityKind::Pressure,
        QuantityKind::Speed,
        QuantityKind::MassFlowRate,
        QuantityKind::ThermalResistance,
        QuantityKind::ThermalConductivity,
    ];

    /// Conversion table key.
    pub const fn key(&self) -> &'static str {
        match self {
            QuantityKind::Dimensionless => "dimensionless",
            QuantityKind::Length => "length",
            QuantityKind::Mass => "mass",
            QuantityKind::Time => "time",
            QuantityKind::Temperature => "temperature",
            QuantityKind::Current => "electric_current",
            QuantityKind::Substance => "amount_of_substance",
            QuantityKind::LuminousIntensity => "luminous_intensity",
            QuantityKind::Voltage => "voltage",
            QuantityKind::Power => "power",
            QuantityKind::Energy => "energy",
            QuantityKind::Charge => "electric_charge",
            QuantityKind::Frequency => "frequency",
            QuantityKind::Resistance => "resistance",
            QuantityKind::Angle => "angle",
            QuantityKind::Area => "area",
            QuantityKind::Volume => "volume",
            QuantityKind::Force => "force",
            QuantityKind::Pressure => "pressure",
            QuantityKind::Speed => "speed",
            QuantityKind::MassFlowRate => "mass_flow_rate",
            QuantityKind::ThermalResistance => "thermal_resistance",
            QuantityKind::ThermalConductivity => "thermal_conductivity",
            QuantityKind::Derived => "derived",
        }
    }

    /// Symbol of the unit used when a quantity is built without one.
    pub const fn default_symbol(&self) -> &'static str {
        match self {
            QuantityKind::Dimensionless | QuantityKind::Derived => "1",
            QuantityKind::Length => "m",
            QuantityKind::Mass => "kg",
            QuantityKind::Time => "s",
            QuantityKind::Temperature => "K",
            QuantityKind::Current => "A",
            QuantityKind::Substance => "mol",
            QuantityKind::LuminousIntensity => "cd",
            QuantityKind::Voltage => "V",
            QuantityKind::Power => "W",
            QuantityKind::Energy => "J",
            QuantityKind::Charge => "C",
            QuantityKind::Frequency => "Hz",
            QuantityKind::Resistance => "Ω",
            QuantityKind::Angle => "deg",
            QuantityKind::Area => "m2",
            QuantityKind::Volume => "m3",
            QuantityKind::Force => "N",
            QuantityKind::Pressure => "Pa",
            QuantityKind::Speed => "m/s",
            QuantityKind::MassFlowRate => "kg/s",
            QuantityKind::ThermalResistance => "K/W",
            QuantityKind::ThermalConductivity => "W/(m*K)",
        }
    }

    /// Symbol of the unit whose table factor is 1, the coherent SI unit for
    /// this kind. It differs from the default only for angles.
    pub const fn base_symbol(&self) -> &'static str {
        match self {
            QuantityKind::Angle => "rad",
            _ => self.default_symbol(),
        }
    }

    /// Whether conversions need an offset as well as a scale.
    pub const fn is_affine(&self) -> bool {
        matches!(self, QuantityKind::Temperature)
    }

    /// Canonical dimensions, `None` for [`QuantityKind::Derived`].
    pub fn dimensions(&self) -> Option<Dimensions> {
        let d = Dimensions::new();
        let dims = match self {
            QuantityKind::Dimensionless | QuantityKind::Angle => d,
            QuantityKind::Length => d.with(Length, 1),
            QuantityKind::Mass => d.with(Mass, 1),
            QuantityKind::Time => d.with(Time, 1),
            QuantityKind::Temperature => d.with(Temperature, 1),
            QuantityKind::Current => d.with(Current, 1),
            QuantityKind::Substance => d.with(Substance, 1),
            QuantityKind::LuminousIntensity => d.with(LuminousIntensity, 1),
            QuantityKind::Voltage => d.with(Mass, 1).with(Length, 2).with(Time, -3).with(Current, -1),
            QuantityKind::Power => d.with(Mass, 1).with(Length, 2).with(Time, -3),
            QuantityKind::Energy => d.with(Mass, 1).with(Length, 2).with(Time, -2),
            QuantityKind::Charge => d.with(Current, 1).with(Time, 1),
            QuantityKind::Frequency => d.with(Time, -1),
            QuantityKind::Resistance => d.with(Mass, 1).with(Length, 2).with(Time, -3).with(Current, -2),
            QuantityKind::Area => d.with(Length, 2),
            QuantityKind::Volume => d.with(Length, 3),
            QuantityKind::Force => d.with(Mass, 1).with(Length, 1).with(Time, -2),
            QuantityKind::Pressure => d.with(Mass, 1).with(Length, -1).with(Time, -2),
            QuantityKind::Speed => d.with(Length, 1).with(Time, -1),
            QuantityKind::MassFlowRate => d.with(Mass, 1).with(Time, -1),
            QuantityKind::ThermalResistance => d
                .with(Temperature, 1)
                .with(Mass, -1)
                .with(Length, -2)
                .with(Time, 3),
            QuantityKind::ThermalConductivity => d
                .with(Mass, 1)
                .with(Length, 1)
                .with(Time, -3)
                .with(Temperature, -1),
            QuantityKind::Derived => return None,
        };
        Some(dims)
    }

    /// The unit a quantity of this kind gets when none is given.
    pub fn default_unit(&self) -> Unit {
        Unit::lookup(*self, self.default_symbol()).unwrap_or_else(|| {
            let dims = self.dimensions().unwrap_or_default();
            Unit::new(self.default_symbol(), self.default_symbol(), dims).with_scale(1.0)
        })
    }

    /// First registered kind whose canonical dimensions equal `dims`, or
    /// [`QuantityKind::Derived`] when there is none.
    pub fn from_dimensions(dims: &Dimensions) -> QuantityKind {
        QuantityKind::REGISTERED
            .into_iter()
            .find(|kind| kind.dimensions().as_ref() == Some(dims))
            .unwrap_or(QuantityKind::Derived)
    }

    pub fn from_key(key: &str) -> Option<QuantityKind> {
        QuantityKind::REGISTERED
            .into_iter()
            .chain(std::iter::once(QuantityKind::Derived))
            .find(|kind| kind.key() == key)
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for QuantityKind {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuantityKind::from_key(s).ok_or_else(|| ParseError::UnknownKind(s.to_string()))
    }
}

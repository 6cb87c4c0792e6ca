//! Built-in unit catalog.
//!
//! Every entry names a unit of one kind and its factor relative to the
//! kind's base unit (factor 1). Temperature units carry a scale/offset pair
//! instead, mapping `value * scale + offset` into kelvin.

use std::f64::consts::PI;

use crate::conversion::AffineFactor;
use crate::kind::QuantityKind;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Factor {
    Linear(f64),
    Affine(AffineFactor),
}

impl Factor {
    /// Multiplier into the base unit, ignoring any offset.
    pub(crate) fn scale(&self) -> f64 {
        match self {
            Factor::Linear(f) => *f,
            Factor::Affine(a) => a.scale,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Entry {
    pub kind: QuantityKind,
    pub name: &'static str,
    pub symbol: &'static str,
    pub factor: Factor,
}

const fn lin(kind: QuantityKind, name: &'static str, symbol: &'static str, factor: f64) -> Entry {
    Entry {
        kind,
        name,
        symbol,
        factor: Factor::Linear(factor),
    }
}

const fn aff(
    kind: QuantityKind,
    name: &'static str,
    symbol: &'static str,
    scale: f64,
    offset: f64,
) -> Entry {
    Entry {
        kind,
        name,
        symbol,
        factor: Factor::Affine(AffineFactor { scale, offset }),
    }
}

use QuantityKind as K;

const KELVIN_OFFSET: f64 = 273.15;
const FAHRENHEIT_SCALE: f64 = 5.0 / 9.0;
const POUND: f64 = 0.453_592_37;
const OUNCE: f64 = POUND / 16.0;
const FOOT: f64 = 0.3048;
const INCH: f64 = 0.0254;
const YARD: f64 = 0.9144;
const GAL_US: f64 = 0.003_785_411_784;
const STANDARD_GRAVITY: f64 = 9.806_65;
const CALORIE: f64 = 4.184;
const BTU: f64 = 1055.06;
const HOUR: f64 = 3600.0;

static CATALOG: &[Entry] = &[
    lin(K::Dimensionless, "dimensionless", "1", 1.0),
    lin(K::Dimensionless, "percent", "%", 0.01),
    lin(K::Dimensionless, "parts per million", "ppm", 1e-6),
    // length
    lin(K::Length, "meter", "m", 1.0),
    lin(K::Length, "kilometer", "km", 1e3),
    lin(K::Length, "centimeter", "cm", 1e-2),
    lin(K::Length, "millimeter", "mm", 1e-3),
    lin(K::Length, "micrometer", "um", 1e-6),
    lin(K::Length, "nanometer", "nm", 1e-9),
    lin(K::Length, "inch", "in", INCH),
    lin(K::Length, "mil", "mil", INCH / 1000.0),
    lin(K::Length, "foot", "ft", FOOT),
    lin(K::Length, "yard", "yd", YARD),
    lin(K::Length, "mile", "mi", 1609.344),
    // mass
    lin(K::Mass, "kilogram", "kg", 1.0),
    lin(K::Mass, "gram", "g", 1e-3),
    lin(K::Mass, "milligram", "mg", 1e-6),
    lin(K::Mass, "microgram", "ug", 1e-9),
    lin(K::Mass, "tonne", "t", 1e3),
    lin(K::Mass, "pound", "lb", POUND),
    lin(K::Mass, "ounce", "oz", OUNCE),
    // time
    lin(K::Time, "second", "s", 1.0),
    lin(K::Time, "millisecond", "ms", 1e-3),
    lin(K::Time, "microsecond", "us", 1e-6),
    lin(K::Time, "nanosecond", "ns", 1e-9),
    lin(K::Time, "minute", "min", 60.0),
    lin(K::Time, "hour", "h", HOUR),
    lin(K::Time, "day", "d", 86_400.0),
    // temperature
    aff(K::Temperature, "kelvin", "K", 1.0, 0.0),
    aff(K::Temperature, "celsius", "C", 1.0, KELVIN_OFFSET),
    aff(
        K::Temperature,
        "fahrenheit",
        "F",
        FAHRENHEIT_SCALE,
        KELVIN_OFFSET - 32.0 * FAHRENHEIT_SCALE,
    ),
    aff(K::Temperature, "rankine", "R", FAHRENHEIT_SCALE, 0.0),
    // electric current
    lin(K::Current, "ampere", "A", 1.0),
    lin(K::Current, "kiloampere", "kA", 1e3),
    lin(K::Current, "milliampere", "mA", 1e-3),
    lin(K::Current, "microampere", "uA", 1e-6),
    lin(K::Current, "nanoampere", "nA", 1e-9),
    // amount of substance
    lin(K::Substance, "mole", "mol", 1.0),
    lin(K::Substance, "millimole", "mmol", 1e-3),
    lin(K::Substance, "kilomole", "kmol", 1e3),
    // luminous intensity
    lin(K::LuminousIntensity, "candela", "cd", 1.0),
    lin(K::LuminousIntensity, "microcandela", "ucd", 1e-6),
    lin(K::LuminousIntensity, "millicandela", "mcd", 1e-3),
    lin(K::LuminousIntensity, "kilocandela", "kcd", 1e3),
    lin(K::LuminousIntensity, "megacandela", "Mcd", 1e6),
    lin(K::LuminousIntensity, "gigacandela", "Gcd", 1e9),
    // voltage
    lin(K::Voltage, "volt", "V", 1.0),
    lin(K::Voltage, "microvolt", "uV", 1e-6),
    lin(K::Voltage, "millivolt", "mV", 1e-3),
    lin(K::Voltage, "kilovolt", "kV", 1e3),
    lin(K::Voltage, "megavolt", "MV", 1e6),
    // power
    lin(K::Power, "watt", "W", 1.0),
    lin(K::Power, "microwatt", "uW", 1e-6),
    lin(K::Power, "milliwatt", "mW", 1e-3),
    lin(K::Power, "kilowatt", "kW", 1e3),
    lin(K::Power, "megawatt", "MW", 1e6),
    lin(K::Power, "horsepower", "hp", 745.699_871_582_270_2),
    // energy
    lin(K::Energy, "joule", "J", 1.0),
    lin(K::Energy, "millijoule", "mJ", 1e-3),
    lin(K::Energy, "kilojoule", "kJ", 1e3),
    lin(K::Energy, "megajoule", "MJ", 1e6),
    lin(K::Energy, "milliwatt hour", "mWh", 3.6),
    lin(K::Energy, "watt hour", "Wh", HOUR),
    lin(K::Energy, "kilowatt hour", "kWh", 1e3 * HOUR),
    lin(K::Energy, "calorie", "cal", CALORIE),
    lin(K::Energy, "kilocalorie", "kcal", 1e3 * CALORIE),
    lin(K::Energy, "british thermal unit", "BTU", BTU),
    lin(K::Energy, "electronvolt", "eV", 1.602_176_634e-19),
    // electric charge
    lin(K::Charge, "coulomb", "C", 1.0),
    lin(K::Charge, "millicoulomb", "mC", 1e-3),
    lin(K::Charge, "microcoulomb", "uC", 1e-6),
    lin(K::Charge, "ampere hour", "Ah", HOUR),
    lin(K::Charge, "milliampere hour", "mAh", 3.6),
    // frequency
    lin(K::Frequency, "hertz", "Hz", 1.0),
    lin(K::Frequency, "kilohertz", "kHz", 1e3),
    lin(K::Frequency, "megahertz", "MHz", 1e6),
    lin(K::Frequency, "gigahertz", "GHz", 1e9),
    lin(K::Frequency, "radian per second", "rad/s", 1.0 / (2.0 * PI)),
    lin(K::Frequency, "degree per second", "deg/s", 1.0 / 360.0),
    lin(K::Frequency, "revolution per minute", "rpm", 1.0 / 60.0),
    // resistance
    lin(K::Resistance, "ohm", "Ω", 1.0),
    lin(K::Resistance, "microohm", "uΩ", 1e-6),
    lin(K::Resistance, "milliohm", "mΩ", 1e-3),
    lin(K::Resistance, "kiloohm", "kΩ", 1e3),
    lin(K::Resistance, "megaohm", "MΩ", 1e6),
    lin(K::Resistance, "gigaohm", "GΩ", 1e9),
    // angle
    lin(K::Angle, "radian", "rad", 1.0),
    lin(K::Angle, "degree", "deg", PI / 180.0),
    lin(K::Angle, "gradian", "grad", PI / 200.0),
    lin(K::Angle, "revolution", "rev", 2.0 * PI),
    lin(K::Angle, "arcminute", "arcmin", PI / 10_800.0),
    lin(K::Angle, "arcsecond", "arcsec", PI / 648_000.0),
    // area
    lin(K::Area, "square meter", "m2", 1.0),
    lin(K::Area, "square kilometer", "km2", 1e6),
    lin(K::Area, "square centimeter", "cm2", 1e-4),
    lin(K::Area, "square millimeter", "mm2", 1e-6),
    lin(K::Area, "square inch", "in2", INCH * INCH),
    lin(K::Area, "square foot", "ft2", FOOT * FOOT),
    lin(K::Area, "square yard", "yd2", YARD * YARD),
    lin(K::Area, "hectare", "ha", 1e4),
    lin(K::Area, "acre", "acre", 4046.856_422_4),
    // volume
    lin(K::Volume, "cubic meter", "m3", 1.0),
    lin(K::Volume, "cubic centimeter", "cm3", 1e-6),
    lin(K::Volume, "liter", "L", 1e-3),
    lin(K::Volume, "milliliter", "mL", 1e-6),
    lin(K::Volume, "cubic foot", "ft3", FOOT * FOOT * FOOT),
    lin(K::Volume, "cubic yard", "yd3", YARD * YARD * YARD),
    lin(K::Volume, "US gallon", "gal", GAL_US),
    // force
    lin(K::Force, "newton", "N", 1.0),
    lin(K::Force, "kilonewton", "kN", 1e3),
    lin(K::Force, "kilogram force", "kgf", STANDARD_GRAVITY),
    lin(K::Force, "pound force", "lbf", POUND * STANDARD_GRAVITY),
    lin(K::Force, "ounce force", "ozf", OUNCE * STANDARD_GRAVITY),
    // pressure
    lin(K::Pressure, "pascal", "Pa", 1.0),
    lin(K::Pressure, "kilopascal", "kPa", 1e3),
    lin(K::Pressure, "megapascal", "MPa", 1e6),
    lin(K::Pressure, "gigapascal", "GPa", 1e9),
    lin(K::Pressure, "bar", "bar", 1e5),
    lin(K::Pressure, "millibar", "mbar", 100.0),
    lin(K::Pressure, "atmosphere", "atm", 101_325.0),
    lin(K::Pressure, "pound per square inch", "psi", 6894.757_293_168),
    // speed
    lin(K::Speed, "meter per second", "m/s", 1.0),
    lin(K::Speed, "kilometer per second", "km/s", 1e3),
    lin(K::Speed, "centimeter per second", "cm/s", 1e-2),
    lin(K::Speed, "millimeter per second", "mm/s", 1e-3),
    lin(K::Speed, "micrometer per second", "um/s", 1e-6),
    lin(K::Speed, "kilometer per hour", "km/h", 1e3 / HOUR),
    lin(K::Speed, "mile per hour", "mph", 0.447_04),
    lin(K::Speed, "knot", "kn", 1852.0 / HOUR),
    // mass flow rate
    lin(K::MassFlowRate, "kilogram per second", "kg/s", 1.0),
    lin(K::MassFlowRate, "gram per second", "g/s", 1e-3),
    lin(K::MassFlowRate, "milligram per second", "mg/s", 1e-6),
    lin(K::MassFlowRate, "microgram per second", "ug/s", 1e-9),
    lin(K::MassFlowRate, "nanogram per second", "ng/s", 1e-12),
    lin(K::MassFlowRate, "pound per second", "lb/s", POUND),
    lin(K::MassFlowRate, "ounce per second", "oz/s", OUNCE),
    // thermal resistance
    lin(K::ThermalResistance, "kelvin per watt", "K/W", 1.0),
    lin(K::ThermalResistance, "millikelvin per watt", "mK/W", 1e-3),
    lin(K::ThermalResistance, "kilokelvin per watt", "kK/W", 1e3),
    // thermal conductivity
    lin(K::ThermalConductivity, "watt per meter kelvin", "W/(m*K)", 1.0),
    lin(K::ThermalConductivity, "milliwatt per meter kelvin", "mW/(m*K)", 1e-3),
    lin(K::ThermalConductivity, "kilowatt per meter kelvin", "kW/(m*K)", 1e3),
    lin(K::ThermalConductivity, "watt per centimeter kelvin", "W/(cm*K)", 100.0),
    lin(
        K::ThermalConductivity,
        "calorie per second centimeter kelvin",
        "cal/(s*cm*K)",
        CALORIE * 100.0,
    ),
    lin(
        K::ThermalConductivity,
        "BTU per hour foot fahrenheit",
        "BTU/(h*ft*F)",
        BTU / (HOUR * FOOT * FAHRENHEIT_SCALE),
    ),
];

pub(crate) fn entries(kind: QuantityKind) -> impl Iterator<Item = &'static Entry> {
    CATALOG.iter().filter(move |entry| entry.kind == kind)
}

pub(crate) fn find(kind: QuantityKind, symbol: &str) -> Option<&'static Entry> {
    entries(kind).find(|entry| entry.symbol == symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_registered_kind_has_its_default_unit() {
        for kind in QuantityKind::REGISTERED {
            assert!(
                find(kind, kind.default_symbol()).is_some(),
                "{kind} has no '{}'",
                kind.default_symbol()
            );
        }
    }

    #[test]
    fn test_base_units_have_unit_factor() {
        for kind in QuantityKind::REGISTERED {
            let entry = find(kind, kind.base_symbol())
                .unwrap_or_else(|| panic!("{kind} has no '{}'", kind.base_symbol()));
            match entry.factor {
                Factor::Linear(f) => assert_eq!(f, 1.0, "{kind}"),
                Factor::Affine(a) => assert_eq!(a, AffineFactor::IDENTITY, "{kind}"),
            }
        }
        // degrees are the default, radians the base
        assert_ne!(QuantityKind::Angle.default_symbol(), QuantityKind::Angle.base_symbol());
    }

    #[test]
    fn test_symbols_unique_within_kind() {
        for kind in QuantityKind::REGISTERED {
            let symbols: Vec<_> = entries(kind).map(|e| e.symbol).collect();
            let mut deduped = symbols.clone();
            deduped.sort_unstable();
            deduped.dedup();
            assert_eq!(symbols.len(), deduped.len(), "{kind}");
        }
    }

    #[test]
    fn test_only_temperature_is_affine() {
        for entry in CATALOG {
            let affine = matches!(entry.factor, Factor::Affine(_));
            assert_eq!(affine, entry.kind.is_affine(), "{}", entry.symbol);
        }
    }
}

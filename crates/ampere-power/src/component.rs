use std::fmt;

use ampere_units::{Quantity, QuantityKind};
use serde::{Deserialize, Serialize};

use crate::error::{PowerError, expect_kind};

/// Relative difference above which a supplied power is reported as
/// inconsistent with voltage × current.
const POWER_MISMATCH_TOLERANCE: f64 = 1e-9;

/// An electrical load described by its voltage, current and power.
///
/// Two of the three are enough; the third is derived on construction in
/// volts, amperes or watts. Assigning a new value afterwards does not
/// recompute anything until one of the `compute_*` methods is called.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "ComponentFields")]
pub struct Component {
    name: String,
    voltage: Quantity,
    current: Quantity,
    power: Quantity,
}

/// Serialized form of a [`Component`]; any two fields are enough to
/// rebuild it.
#[derive(Deserialize)]
struct ComponentFields {
    name: String,
    #[serde(default)]
    voltage: Option<Quantity>,
    #[serde(default)]
    current: Option<Quantity>,
    #[serde(default)]
    power: Option<Quantity>,
}

impl TryFrom<ComponentFields> for Component {
    type Error = PowerError;

    fn try_from(fields: ComponentFields) -> Result<Self, Self::Error> {
        Component::new(fields.name, fields.voltage, fields.current, fields.power)
    }
}

fn derive_power(voltage: &Quantity, current: &Quantity) -> Result<Quantity, PowerError> {
    Ok(voltage.multiply(current).convert_to_symbol("W")?)
}

fn derive_current(voltage: &Quantity, power: &Quantity) -> Result<Quantity, PowerError> {
    Ok(power.divide(voltage)?.convert_to_symbol("A")?)
}

fn derive_voltage(current: &Quantity, power: &Quantity) -> Result<Quantity, PowerError> {
    Ok(power.divide(current)?.convert_to_symbol("V")?)
}

impl Component {
    /// Build a component from at least two of voltage, current and power.
    ///
    /// When all three are given the voltage and current win and the power is
    /// recomputed from them.
    pub fn new(
        name: impl Into<String>,
        voltage: Option<Quantity>,
        current: Option<Quantity>,
        power: Option<Quantity>,
    ) -> Result<Self, PowerError> {
        let name = name.into();
        for (quantity, kind) in [
            (&voltage, QuantityKind::Voltage),
            (&current, QuantityKind::Current),
            (&power, QuantityKind::Power),
        ] {
            if let Some(quantity) = quantity {
                expect_kind(quantity, kind)?;
            }
        }

        match (voltage, current, power) {
            (Some(voltage), Some(current), supplied) => {
                let power = derive_power(&voltage, &current)?;
                if let Some(supplied) = supplied {
                    let watts = supplied.value_in("W")?;
                    let derived = power.value();
                    let scale = watts.abs().max(derived.abs()).max(f64::MIN_POSITIVE);
                    if (watts - derived).abs() > POWER_MISMATCH_TOLERANCE * scale {
                        log::warn!(
                            "Component '{name}': supplied power {supplied} disagrees with \
                             {voltage} x {current} = {power}; keeping the derived value"
                        );
                    }
                }
                Ok(Self {
                    name,
                    voltage,
                    current,
                    power,
                })
            }
            (Some(voltage), None, Some(power)) => Ok(Self {
                current: derive_current(&voltage, &power)?,
                name,
                voltage,
                power,
            }),
            (None, Some(current), Some(power)) => Ok(Self {
                voltage: derive_voltage(&current, &power)?,
                name,
                current,
                power,
            }),
            _ => Err(PowerError::invalid(format!(
                "component '{name}' needs at least two of voltage, current and power"
            ))),
        }
    }

    pub fn from_voltage_current(
        name: impl Into<String>,
        voltage: Quantity,
        current: Quantity,
    ) -> Result<Self, PowerError> {
        Self::new(name, Some(voltage), Some(current), None)
    }

    pub fn from_voltage_power(
        name: impl Into<String>,
        voltage: Quantity,
        power: Quantity,
    ) -> Result<Self, PowerError> {
        Self::new(name, Some(voltage), None, Some(power))
    }

    pub fn from_current_power(
        name: impl Into<String>,
        current: Quantity,
        power: Quantity,
    ) -> Result<Self, PowerError> {
        Self::new(name, None, Some(current), Some(power))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn voltage(&self) -> &Quantity {
        &self.voltage
    }

    pub fn current(&self) -> &Quantity {
        &self.current
    }

    pub fn power(&self) -> &Quantity {
        &self.power
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_voltage(&mut self, voltage: Quantity) -> Result<(), PowerError> {
        expect_kind(&voltage, QuantityKind::Voltage)?;
        self.voltage = voltage;
        Ok(())
    }

    pub fn set_current(&mut self, current: Quantity) -> Result<(), PowerError> {
        expect_kind(&current, QuantityKind::Current)?;
        self.current = current;
        Ok(())
    }

    pub fn set_power(&mut self, power: Quantity) -> Result<(), PowerError> {
        expect_kind(&power, QuantityKind::Power)?;
        self.power = power;
        Ok(())
    }

    /// Recompute power from the current voltage and current.
    pub fn compute_power(&mut self) -> Result<(), PowerError> {
        self.power = derive_power(&self.voltage, &self.current)?;
        Ok(())
    }

    /// Recompute current from the current voltage and power.
    pub fn compute_current(&mut self) -> Result<(), PowerError> {
        self.current = derive_current(&self.voltage, &self.power)?;
        Ok(())
    }

    /// Recompute voltage from the current current and power.
    pub fn compute_voltage(&mut self) -> Result<(), PowerError> {
        self.voltage = derive_voltage(&self.current, &self.power)?;
        Ok(())
    }

    /// Energy drawn over `duration`, in joules.
    pub fn energy_consumption(&self, duration: &Quantity) -> Result<Quantity, PowerError> {
        expect_kind(duration, QuantityKind::Time)?;
        let watts = self.power.value_in("W")?;
        let seconds = duration.value_in("s")?;
        Ok(Quantity::energy(watts * seconds))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: V={} I={} P={}",
            self.name, self.voltage, self.current, self.power
        )
    }
}

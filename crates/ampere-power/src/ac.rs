use std::f64::consts::{PI, SQRT_2, TAU};
use std::fmt;

use ampere_units::{Quantity, QuantityKind};

use crate::error::{PowerError, expect_kind};

/// Frequencies at or below this many hertz are treated as DC.
pub const MIN_FREQUENCY_HZ: f64 = 1e-6;

/// A sinusoidal voltage given by its RMS value, frequency and phase.
#[derive(Clone, Debug)]
pub struct AcVoltage {
    rms: Quantity,
    amplitude: Quantity,
    frequency: Quantity,
    phase: Quantity,
}

/// Wrap an angle in radians into (-π, π].
fn normalize_radians(radians: f64) -> f64 {
    let wrapped = radians.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

impl AcVoltage {
    /// `phase` defaults to zero degrees. It is stored normalized into
    /// (-π, π] but keeps the unit it was given in.
    pub fn new(
        rms: Quantity,
        frequency: Quantity,
        phase: Option<Quantity>,
    ) -> Result<Self, PowerError> {
        expect_kind(&rms, QuantityKind::Voltage)?;
        expect_kind(&frequency, QuantityKind::Frequency)?;
        let hz = frequency.value_in("Hz")?;
        if hz <= MIN_FREQUENCY_HZ || hz.is_nan() {
            return Err(PowerError::invalid(format!(
                "frequency must be positive and non-zero, got {frequency}"
            )));
        }

        let phase = phase.unwrap_or_else(|| Quantity::angle(0.0));
        expect_kind(&phase, QuantityKind::Angle)?;
        let radians = normalize_radians(phase.value_in("rad")?);
        let phase = Quantity::in_unit(QuantityKind::Angle, radians, "rad")?.convert_to(phase.unit())?;

        Ok(Self {
            amplitude: rms.scale(SQRT_2),
            rms,
            frequency,
            phase,
        })
    }

    pub fn rms(&self) -> &Quantity {
        &self.rms
    }

    /// Peak value, `rms × √2`, in the RMS unit.
    pub fn amplitude(&self) -> &Quantity {
        &self.amplitude
    }

    pub fn frequency(&self) -> &Quantity {
        &self.frequency
    }

    pub fn phase(&self) -> &Quantity {
        &self.phase
    }

    /// Duration of one cycle in seconds.
    pub fn period(&self) -> Result<Quantity, PowerError> {
        Ok(Quantity::time(1.0 / self.frequency.value_in("Hz")?))
    }

    /// Instantaneous voltage at time `t`, in the RMS unit.
    pub fn value_at(&self, t: &Quantity) -> Result<Quantity, PowerError> {
        expect_kind(t, QuantityKind::Time)?;
        let omega = TAU * self.frequency.value_in("Hz")?;
        let angle = omega * t.value_in("s")? + self.phase.value_in("rad")?;
        Ok(self.amplitude.scale(angle.sin()))
    }
}

impl fmt::Display for AcVoltage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} RMS @ {} ϕ = {}", self.rms, self.frequency, self.phase)
    }
}

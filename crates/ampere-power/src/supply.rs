//! Power supplies and the loads drawn from them.
//!
//! Every supply keeps an ordered list of [`Load`]s and the totals rolled up
//! from it. The totals are recomputed from scratch after each change to the
//! list: current in milliamperes, power in milliwatts at the nominal voltage.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ampere_units::{Quantity, QuantityKind};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::error::{PowerError, expect_kind};
use crate::load::{self, Load};

pub const LEAD_ACID_CELL_VOLTAGE: f64 = 2.0;
const LEAD_ACID_CHEMISTRY: &str = "Lead-Acid";
const LEAD_ACID_SUBCHEMISTRY: &str = "Undefined";
const LITHIUM_CHEMISTRY: &str = "Lithium";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LithiumChemistry {
    #[serde(rename = "LiPo")]
    LiPo,
    #[serde(rename = "Li-ion")]
    LiIon,
    #[serde(rename = "LiFePO4")]
    LiFePo4,
    #[serde(rename = "LiMn2O4")]
    LiMn2O4,
    #[serde(rename = "LiCoO2")]
    LiCoO2,
    /// Any other cell; the cell voltage has to be given explicitly.
    Other,
}

impl LithiumChemistry {
    pub const ALL: [LithiumChemistry; 6] = [
        LithiumChemistry::LiPo,
        LithiumChemistry::LiIon,
        LithiumChemistry::LiFePo4,
        LithiumChemistry::LiMn2O4,
        LithiumChemistry::LiCoO2,
        LithiumChemistry::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LithiumChemistry::LiPo => "LiPo",
            LithiumChemistry::LiIon => "Li-ion",
            LithiumChemistry::LiFePo4 => "LiFePO4",
            LithiumChemistry::LiMn2O4 => "LiMn2O4",
            LithiumChemistry::LiCoO2 => "LiCoO2",
            LithiumChemistry::Other => "Other",
        }
    }

    /// Nominal cell voltage in volts, `None` for [`LithiumChemistry::Other`].
    pub fn cell_voltage(&self) -> Option<f64> {
        match self {
            LithiumChemistry::LiPo | LithiumChemistry::LiMn2O4 => Some(3.7),
            LithiumChemistry::LiIon | LithiumChemistry::LiCoO2 => Some(3.6),
            LithiumChemistry::LiFePo4 => Some(3.2),
            LithiumChemistry::Other => None,
        }
    }
}

impl fmt::Display for LithiumChemistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LithiumChemistry {
    type Err = PowerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LithiumChemistry::ALL
            .into_iter()
            .find(|chemistry| chemistry.name() == s)
            .ok_or_else(|| {
                PowerError::invalid(format!(
                    "unknown lithium subchemistry '{s}', expected one of {}",
                    LithiumChemistry::ALL.iter().join(", ")
                ))
            })
    }
}

#[derive(Clone, Debug)]
pub struct Battery {
    chemistry: String,
    subchemistry: String,
    cell_count: u32,
    cell_voltage: Quantity,
    capacity: Quantity,
}

impl Battery {
    pub fn new(
        chemistry: impl Into<String>,
        subchemistry: impl Into<String>,
        cell_voltage: Quantity,
        capacity: Quantity,
        cell_count: u32,
    ) -> Result<Self, PowerError> {
        expect_kind(&cell_voltage, QuantityKind::Voltage)?;
        expect_kind(&capacity, QuantityKind::Charge)?;
        if cell_count == 0 {
            return Err(PowerError::invalid("cell count must be a positive integer"));
        }
        if cell_voltage.value() < 0.0 || cell_voltage.value().is_nan() {
            return Err(PowerError::invalid(format!(
                "cell voltage must not be negative, got {cell_voltage}"
            )));
        }
        if capacity.value() < 0.0 || capacity.value().is_nan() {
            return Err(PowerError::invalid(format!(
                "battery capacity must not be negative, got {capacity}"
            )));
        }
        Ok(Self {
            chemistry: chemistry.into(),
            subchemistry: subchemistry.into(),
            cell_count,
            cell_voltage,
            capacity,
        })
    }

    /// Lead-acid cells at 2.0 V each.
    pub fn lead_acid(capacity: Quantity, cell_count: u32) -> Result<Self, PowerError> {
        Self::new(
            LEAD_ACID_CHEMISTRY,
            LEAD_ACID_SUBCHEMISTRY,
            Quantity::voltage(LEAD_ACID_CELL_VOLTAGE),
            capacity,
            cell_count,
        )
    }

    /// Lithium cells. The cell voltage comes from `subchemistry`; `cell_voltage`
    /// is only used, and then required, for [`LithiumChemistry::Other`].
    pub fn lithium(
        subchemistry: LithiumChemistry,
        cell_voltage: Option<Quantity>,
        capacity: Quantity,
        cell_count: u32,
    ) -> Result<Self, PowerError> {
        let cell_voltage = match subchemistry.cell_voltage() {
            Some(volts) => Quantity::voltage(volts),
            None => cell_voltage.ok_or_else(|| {
                PowerError::invalid("cell voltage is required for subchemistry 'Other'")
            })?,
        };
        Self::new(
            LITHIUM_CHEMISTRY,
            subchemistry.name(),
            cell_voltage,
            capacity,
            cell_count,
        )
    }

    pub fn chemistry(&self) -> &str {
        &self.chemistry
    }

    pub fn subchemistry(&self) -> &str {
        &self.subchemistry
    }

    pub fn cell_count(&self) -> u32 {
        self.cell_count
    }

    pub fn cell_voltage(&self) -> &Quantity {
        &self.cell_voltage
    }

    pub fn capacity(&self) -> &Quantity {
        &self.capacity
    }

    /// `cell_count × cell_voltage`, in the cell voltage's unit.
    pub fn nominal_voltage(&self) -> Quantity {
        self.cell_voltage.scale(f64::from(self.cell_count))
    }
}

/// Input range and efficiency shared by linear regulators and DC-DC
/// converters.
#[derive(Clone, Debug)]
pub struct Regulator {
    min_input_voltage: Quantity,
    max_input_voltage: Quantity,
    efficiency: f64,
}

impl Regulator {
    pub const MIN_EFFICIENCY: f64 = 0.0;
    pub const MAX_EFFICIENCY: f64 = 1.0;

    pub fn new(
        min_input_voltage: Quantity,
        max_input_voltage: Quantity,
        efficiency: f64,
    ) -> Result<Self, PowerError> {
        expect_kind(&min_input_voltage, QuantityKind::Voltage)?;
        expect_kind(&max_input_voltage, QuantityKind::Voltage)?;
        if min_input_voltage.greater_than(&max_input_voltage)? {
            return Err(PowerError::invalid(format!(
                "minimum input voltage {min_input_voltage} exceeds maximum input voltage {max_input_voltage}"
            )));
        }
        if !(Self::MIN_EFFICIENCY..=Self::MAX_EFFICIENCY).contains(&efficiency) {
            return Err(PowerError::invalid(format!(
                "efficiency must be between {} and {}, got {efficiency}",
                Self::MIN_EFFICIENCY,
                Self::MAX_EFFICIENCY
            )));
        }
        Ok(Self {
            min_input_voltage,
            max_input_voltage,
            efficiency,
        })
    }

    /// A lossless regulator.
    pub fn ideal(min_input_voltage: Quantity, max_input_voltage: Quantity) -> Result<Self, PowerError> {
        Self::new(min_input_voltage, max_input_voltage, Self::MAX_EFFICIENCY)
    }

    pub fn min_input_voltage(&self) -> &Quantity {
        &self.min_input_voltage
    }

    pub fn max_input_voltage(&self) -> &Quantity {
        &self.max_input_voltage
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    Buck,
    Boost,
    BuckBoost,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Topology::Buck => "Buck",
            Topology::Boost => "Boost",
            Topology::BuckBoost => "Buck-Boost",
        })
    }
}

#[derive(Clone, Debug)]
pub enum SupplyKind {
    Battery(Battery),
    LinearRegulator(Regulator),
    DcDc {
        topology: Topology,
        regulator: Regulator,
    },
}

impl SupplyKind {
    pub fn battery(&self) -> Option<&Battery> {
        match self {
            SupplyKind::Battery(battery) => Some(battery),
            _ => None,
        }
    }

    pub fn regulator(&self) -> Option<&Regulator> {
        match self {
            SupplyKind::LinearRegulator(regulator) | SupplyKind::DcDc { regulator, .. } => {
                Some(regulator)
            }
            SupplyKind::Battery(_) => None,
        }
    }

    fn title(&self) -> String {
        match self {
            SupplyKind::Battery(_) => "Battery".to_string(),
            SupplyKind::LinearRegulator(_) => "Linear regulator".to_string(),
            SupplyKind::DcDc { topology, .. } => format!("{topology} converter"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PowerSupply {
    name: String,
    nominal_voltage: Quantity,
    max_output_current: Quantity,
    kind: SupplyKind,
    loads: Vec<Load>,
    total_current: Quantity,
    total_power: Quantity,
}

impl PowerSupply {
    fn build(
        name: impl Into<String>,
        nominal_voltage: Quantity,
        max_output_current: Quantity,
        kind: SupplyKind,
    ) -> Result<Self, PowerError> {
        expect_kind(&nominal_voltage, QuantityKind::Voltage)?;
        expect_kind(&max_output_current, QuantityKind::Current)?;
        Ok(Self {
            name: name.into(),
            nominal_voltage,
            max_output_current,
            kind,
            loads: Vec::new(),
            total_current: Quantity::in_unit(QuantityKind::Current, 0.0, "mA")?,
            total_power: Quantity::in_unit(QuantityKind::Power, 0.0, "mW")?,
        })
    }

    pub fn battery(
        name: impl Into<String>,
        battery: Battery,
        max_output_current: Quantity,
    ) -> Result<Self, PowerError> {
        let nominal_voltage = battery.nominal_voltage();
        Self::build(
            name,
            nominal_voltage,
            max_output_current,
            SupplyKind::Battery(battery),
        )
    }

    pub fn lead_acid_battery(
        name: impl Into<String>,
        max_output_current: Quantity,
        capacity: Quantity,
        cell_count: u32,
    ) -> Result<Self, PowerError> {
        let battery = Battery::lead_acid(capacity, cell_count)?;
        Self::battery(name, battery, max_output_current)
    }

    pub fn lithium_battery(
        name: impl Into<String>,
        max_output_current: Quantity,
        capacity: Quantity,
        subchemistry: LithiumChemistry,
        cell_voltage: Option<Quantity>,
        cell_count: u32,
    ) -> Result<Self, PowerError> {
        let battery = Battery::lithium(subchemistry, cell_voltage, capacity, cell_count)?;
        Self::battery(name, battery, max_output_current)
    }

    pub fn linear_regulator(
        name: impl Into<String>,
        nominal_voltage: Quantity,
        max_output_current: Quantity,
        regulator: Regulator,
    ) -> Result<Self, PowerError> {
        Self::build(
            name,
            nominal_voltage,
            max_output_current,
            SupplyKind::LinearRegulator(regulator),
        )
    }

    /// A DC-DC converter. A buck converter must output strictly less than its
    /// minimum input voltage and a boost converter strictly more than its
    /// maximum input voltage. These are only checked here.
    pub fn dc_dc(
        name: impl Into<String>,
        topology: Topology,
        nominal_voltage: Quantity,
        max_output_current: Quantity,
        regulator: Regulator,
    ) -> Result<Self, PowerError> {
        expect_kind(&nominal_voltage, QuantityKind::Voltage)?;
        match topology {
            Topology::Buck => {
                if !nominal_voltage.less_than(regulator.min_input_voltage())? {
                    return Err(PowerError::invalid(format!(
                        "buck output {nominal_voltage} must be below the minimum input voltage {}",
                        regulator.min_input_voltage()
                    )));
                }
            }
            Topology::Boost => {
                if !nominal_voltage.greater_than(regulator.max_input_voltage())? {
                    return Err(PowerError::invalid(format!(
                        "boost output {nominal_voltage} must be above the maximum input voltage {}",
                        regulator.max_input_voltage()
                    )));
                }
            }
            Topology::BuckBoost => {}
        }
        Self::build(
            name,
            nominal_voltage,
            max_output_current,
            SupplyKind::DcDc {
                topology,
                regulator,
            },
        )
    }

    pub fn buck_converter(
        name: impl Into<String>,
        nominal_voltage: Quantity,
        max_output_current: Quantity,
        regulator: Regulator,
    ) -> Result<Self, PowerError> {
        Self::dc_dc(name, Topology::Buck, nominal_voltage, max_output_current, regulator)
    }

    pub fn boost_converter(
        name: impl Into<String>,
        nominal_voltage: Quantity,
        max_output_current: Quantity,
        regulator: Regulator,
    ) -> Result<Self, PowerError> {
        Self::dc_dc(name, Topology::Boost, nominal_voltage, max_output_current, regulator)
    }

    pub fn buck_boost_converter(
        name: impl Into<String>,
        nominal_voltage: Quantity,
        max_output_current: Quantity,
        regulator: Regulator,
    ) -> Result<Self, PowerError> {
        Self::dc_dc(
            name,
            Topology::BuckBoost,
            nominal_voltage,
            max_output_current,
            regulator,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn nominal_voltage(&self) -> &Quantity {
        &self.nominal_voltage
    }

    pub fn max_output_current(&self) -> &Quantity {
        &self.max_output_current
    }

    pub fn kind(&self) -> &SupplyKind {
        &self.kind
    }

    pub fn components(&self) -> &[Load] {
        &self.loads
    }

    /// Total current drawn by all loads, in milliamperes.
    pub fn total_current(&self) -> &Quantity {
        &self.total_current
    }

    /// Total power delivered at the nominal voltage, in milliwatts.
    pub fn total_power(&self) -> &Quantity {
        &self.total_power
    }

    /// Number of components counting multiplicities.
    pub fn total_components(&self) -> u64 {
        load::count(&self.loads)
    }

    /// Rated output current left over after the current loads, in the unit
    /// of the rating. Negative when the supply is overloaded.
    pub fn headroom(&self) -> Result<Quantity, PowerError> {
        Ok(self.max_output_current.subtract(&self.total_current)?)
    }

    pub fn add_component(
        &mut self,
        component: impl Into<Arc<Component>>,
        multiplicity: u32,
    ) -> Result<(), PowerError> {
        let mut loads = self.loads.clone();
        loads.push(Load::new(component, multiplicity));
        self.commit(loads)
    }

    pub fn remove_component(&mut self, index: usize) -> Result<Load, PowerError> {
        PowerError::check_index(index, self.loads.len())?;
        let mut loads = self.loads.clone();
        let removed = loads.remove(index);
        self.commit(loads)?;
        Ok(removed)
    }

    /// Change how many of a load are drawn; zero removes the entry.
    pub fn modify_component_quantity(
        &mut self,
        index: usize,
        multiplicity: u32,
    ) -> Result<(), PowerError> {
        PowerError::check_index(index, self.loads.len())?;
        if multiplicity == 0 {
            return self.remove_component(index).map(|_| ());
        }
        let mut loads = self.loads.clone();
        loads[index].set_multiplicity(multiplicity);
        self.commit(loads)
    }

    fn commit(&mut self, loads: Vec<Load>) -> Result<(), PowerError> {
        let (total_current, total_power) = self.rollup(&loads)?;
        self.loads = loads;
        self.total_current = total_current;
        self.total_power = total_power;
        self.check_capacity();
        Ok(())
    }

    fn rollup(&self, loads: &[Load]) -> Result<(Quantity, Quantity), PowerError> {
        let volts = self.nominal_voltage.value_in("V")?;
        let mut milliamps = 0.0;
        for load in loads {
            let current = load.component().current().value_in("mA")?;
            milliamps += current * f64::from(load.multiplicity());
        }
        let total_current = Quantity::in_unit(QuantityKind::Current, milliamps, "mA")?;
        let total_power = Quantity::in_unit(QuantityKind::Power, milliamps * volts, "mW")?;
        log::trace!(
            "Supply '{}': {} loads draw {} ({})",
            self.name,
            loads.len(),
            total_current,
            total_power
        );
        Ok((total_current, total_power))
    }

    fn check_capacity(&self) {
        let Ok(max_ma) = self.max_output_current.value_in("mA") else {
            return;
        };
        if self.total_current.value() > max_ma {
            log::warn!(
                "Supply '{}' draws {} which exceeds its maximum output current of {}",
                self.name,
                self.total_current,
                self.max_output_current
            );
        }
    }
}

impl fmt::Display for PowerSupply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.kind.title(), self.name)?;
        writeln!(f, "  nominal voltage: {}", self.nominal_voltage)?;
        writeln!(f, "  max output current: {}", self.max_output_current)?;
        match &self.kind {
            SupplyKind::Battery(battery) => {
                writeln!(
                    f,
                    "  chemistry: {} ({})",
                    battery.chemistry, battery.subchemistry
                )?;
                writeln!(
                    f,
                    "  cells: {} x {}",
                    battery.cell_count, battery.cell_voltage
                )?;
                writeln!(f, "  capacity: {}", battery.capacity)?;
            }
            SupplyKind::LinearRegulator(regulator) | SupplyKind::DcDc { regulator, .. } => {
                writeln!(
                    f,
                    "  input voltage: {} to {}",
                    regulator.min_input_voltage, regulator.max_input_voltage
                )?;
                writeln!(f, "  efficiency: {:.1}%", regulator.efficiency * 100.0)?;
            }
        }
        if self.loads.is_empty() {
            writeln!(f, "  loads: none")?;
        } else {
            writeln!(f, "  loads:")?;
            writeln!(
                f,
                "{}",
                self.loads.iter().map(|load| format!("    - {load}")).join("\n")
            )?;
        }
        write!(f, "  total: {} ({})", self.total_current, self.total_power)
    }
}

#[cfg(test)]
mod tests {
    use ampere_units::Unit;

    use super::*;

    fn ma(value: f64) -> Quantity {
        Quantity::in_unit(QuantityKind::Current, value, "mA").unwrap()
    }

    fn mah(value: f64) -> Quantity {
        Quantity::in_unit(QuantityKind::Charge, value, "mAh").unwrap()
    }

    fn led() -> Arc<Component> {
        Arc::new(Component::from_voltage_current("led", Quantity::voltage(2.0), ma(10.0)).unwrap())
    }

    fn close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0),
            "{actual} != {expected}"
        );
    }

    #[test]
    fn test_add_then_remove_returns_to_zero() {
        let mut supply = PowerSupply::lead_acid_battery("pack", Quantity::current(1.0), mah(7000.0), 3).unwrap();
        let led = led();
        for _ in 0..3 {
            supply.add_component(led.clone(), 1).unwrap();
        }
        close(supply.total_current().value(), 30.0);
        close(supply.total_power().value(), 180.0);
        assert_eq!(supply.total_components(), 3);

        while !supply.components().is_empty() {
            supply.remove_component(0).unwrap();
        }
        assert_eq!(supply.total_current().value(), 0.0);
        assert_eq!(supply.total_power().value(), 0.0);
        assert_eq!(supply.total_components(), 0);
    }

    #[test]
    fn test_modify_component_quantity() {
        let mut supply = PowerSupply::lead_acid_battery("pack", Quantity::current(1.0), mah(7000.0), 1).unwrap();
        supply.add_component(led(), 2).unwrap();
        close(supply.total_current().value(), 20.0);

        supply.modify_component_quantity(0, 5).unwrap();
        close(supply.total_current().value(), 50.0);
        assert_eq!(supply.total_components(), 5);

        supply.modify_component_quantity(0, 0).unwrap();
        assert!(supply.components().is_empty());
        assert_eq!(supply.total_current().value(), 0.0);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut supply = PowerSupply::lead_acid_battery("pack", Quantity::current(1.0), mah(7000.0), 1).unwrap();
        assert!(matches!(
            supply.remove_component(0),
            Err(PowerError::IndexOutOfRange { index: 0, len: 0 })
        ));
        supply.add_component(led(), 1).unwrap();
        assert!(matches!(
            supply.modify_component_quantity(3, 1),
            Err(PowerError::IndexOutOfRange { index: 3, len: 1 })
        ));
        assert_eq!(supply.total_components(), 1);
    }

    #[test]
    fn test_failed_rollup_leaves_supply_unchanged() {
        let mut supply = PowerSupply::lead_acid_battery("pack", Quantity::current(1.0), mah(7000.0), 1).unwrap();
        supply.add_component(led(), 1).unwrap();

        // a unit with no scale and no table entry cannot be rolled up in mA
        let mut odd = Component::from_voltage_current("odd", Quantity::voltage(1.0), ma(1.0)).unwrap();
        let unscaled = Unit::new("odd", "odd", QuantityKind::Current.dimensions().unwrap());
        odd.set_current(Quantity::new(QuantityKind::Current, 1.0, unscaled).unwrap()).unwrap();
        assert!(supply.add_component(odd, 1).is_err());

        // a composite current does convert
        let mut divided = Component::from_voltage_current("divided", Quantity::voltage(1.0), ma(1.0)).unwrap();
        let resistance = Quantity::resistance(100.0);
        divided.set_current(Quantity::voltage(1.0).divide(&resistance).unwrap()).unwrap();
        supply.add_component(divided, 1).unwrap();
        close(supply.total_current().value(), 20.0);
        supply.remove_component(1).unwrap();

        assert_eq!(supply.components().len(), 1);
        close(supply.total_current().value(), 10.0);
    }

    #[test]
    fn test_battery_validation() {
        assert!(matches!(
            Battery::new("NiMH", "AA", Quantity::voltage(1.2), mah(2000.0), 0),
            Err(PowerError::InvalidConstruction(_))
        ));
        assert!(Battery::new("NiMH", "AA", Quantity::voltage(-1.2), mah(2000.0), 4).is_err());
        assert!(Battery::new("NiMH", "AA", Quantity::voltage(1.2), mah(-1.0), 4).is_err());
        assert!(Battery::new("NiMH", "AA", ma(1.2), mah(2000.0), 4).is_err());

        let nimh = Battery::new("NiMH", "AA", Quantity::voltage(1.2), mah(2000.0), 4).unwrap();
        close(nimh.nominal_voltage().value(), 4.8);
    }

    #[test]
    fn test_lithium_chemistries() {
        for (chemistry, volts) in [
            (LithiumChemistry::LiPo, 3.7),
            (LithiumChemistry::LiIon, 3.6),
            (LithiumChemistry::LiFePo4, 3.2),
            (LithiumChemistry::LiMn2O4, 3.7),
            (LithiumChemistry::LiCoO2, 3.6),
        ] {
            let cell = Battery::lithium(chemistry, None, mah(1000.0), 1).unwrap();
            assert_eq!(cell.cell_voltage().value(), volts);
            assert_eq!(cell.subchemistry(), chemistry.name());
            assert_eq!(cell.chemistry(), "Lithium");
        }

        // an explicit voltage is ignored for known chemistries
        let lipo = Battery::lithium(LithiumChemistry::LiPo, Some(Quantity::voltage(9.0)), mah(1.0), 1).unwrap();
        assert_eq!(lipo.cell_voltage().value(), 3.7);

        assert!(Battery::lithium(LithiumChemistry::Other, None, mah(1.0), 1).is_err());
        let custom = Battery::lithium(LithiumChemistry::Other, Some(Quantity::voltage(3.85)), mah(1.0), 2).unwrap();
        close(custom.nominal_voltage().value(), 7.7);

        assert_eq!("Li-ion".parse::<LithiumChemistry>().unwrap(), LithiumChemistry::LiIon);
        let err = "NiCd".parse::<LithiumChemistry>().unwrap_err();
        insta::assert_snapshot!(
            err,
            @"Invalid construction: unknown lithium subchemistry 'NiCd', expected one of LiPo, Li-ion, LiFePO4, LiMn2O4, LiCoO2, Other"
        );
    }

    #[test]
    fn test_regulator_validation() {
        let v = Quantity::voltage;
        assert!(Regulator::new(v(5.0), v(12.0), 0.85).is_ok());
        assert!(Regulator::new(v(5.0), v(5.0), 0.0).is_ok());
        assert!(matches!(
            Regulator::new(v(12.0), v(5.0), 0.9),
            Err(PowerError::InvalidConstruction(_))
        ));
        assert!(Regulator::new(v(5.0), v(12.0), 1.01).is_err());
        assert!(Regulator::new(v(5.0), v(12.0), -0.1).is_err());
        assert!(Regulator::new(v(5.0), v(12.0), f64::NAN).is_err());

        // limits are compared after unit conversion
        let mv = Quantity::in_unit(QuantityKind::Voltage, 4500.0, "mV").unwrap();
        assert!(Regulator::new(mv, v(4.0), 0.9).is_err());
    }

    #[test]
    fn test_converter_topology_checks() {
        let v = Quantity::voltage;
        let amps = Quantity::current;
        let regulator = Regulator::new(v(5.0), v(12.0), 0.9).unwrap();

        assert!(PowerSupply::buck_converter("buck", v(3.3), amps(1.0), regulator.clone()).is_ok());
        // the output has to be strictly below the lowest input
        assert!(matches!(
            PowerSupply::buck_converter("buck", v(5.0), amps(1.0), regulator.clone()),
            Err(PowerError::InvalidConstruction(_))
        ));
        let mv = Quantity::in_unit(QuantityKind::Voltage, 4999.0, "mV").unwrap();
        assert!(PowerSupply::buck_converter("buck", mv, amps(1.0), regulator.clone()).is_ok());
        assert!(matches!(
            PowerSupply::buck_converter("buck", v(6.0), amps(1.0), regulator.clone()),
            Err(PowerError::InvalidConstruction(_))
        ));

        assert!(PowerSupply::boost_converter("boost", v(24.0), amps(1.0), regulator.clone()).is_ok());
        assert!(matches!(
            PowerSupply::boost_converter("boost", v(12.0), amps(1.0), regulator.clone()),
            Err(PowerError::InvalidConstruction(_))
        ));
        assert!(matches!(
            PowerSupply::boost_converter("boost", v(9.0), amps(1.0), regulator.clone()),
            Err(PowerError::InvalidConstruction(_))
        ));

        let any = PowerSupply::buck_boost_converter("sepic", v(9.0), amps(1.0), regulator).unwrap();
        assert!(matches!(
            any.kind(),
            SupplyKind::DcDc {
                topology: Topology::BuckBoost,
                ..
            }
        ));
        assert_eq!(any.kind().regulator().map(Regulator::efficiency), Some(0.9));
    }

    #[test]
    fn test_headroom() {
        let mut supply = PowerSupply::linear_regulator(
            "ldo",
            Quantity::voltage(3.3),
            ma(100.0),
            Regulator::ideal(Quantity::voltage(3.5), Quantity::voltage(6.0)).unwrap(),
        )
        .unwrap();
        supply.add_component(led(), 4).unwrap();
        close(supply.headroom().unwrap().value(), 60.0);

        // over capacity only warns
        supply.modify_component_quantity(0, 20).unwrap();
        close(supply.headroom().unwrap().value(), -100.0);
    }

    #[test]
    fn test_display() {
        let mut supply = PowerSupply::lead_acid_battery("pack", Quantity::current(2.0), mah(7000.0), 6).unwrap();
        let radio = Component::from_voltage_current("radio", Quantity::voltage(4.0), Quantity::current(0.5)).unwrap();
        supply.add_component(radio, 3).unwrap();
        insta::assert_snapshot!(supply, @r"
        Battery: pack
          nominal voltage: 12 V
          max output current: 2 A
          chemistry: Lead-Acid (Undefined)
          cells: 6 x 2 V
          capacity: 7000 mAh
          loads:
            - radio: V=4 V I=0.5 A P=2 W (x3)
          total: 1500 mA (18000 mW)
        ");

        let buck = PowerSupply::buck_converter(
            "core",
            Quantity::voltage(1.5),
            Quantity::current(3.0),
            Regulator::new(Quantity::voltage(3.0), Quantity::voltage(5.5), 0.92).unwrap(),
        )
        .unwrap();
        insta::assert_snapshot!(buck, @r"
        Buck converter: core
          nominal voltage: 1.5 V
          max output current: 3 A
          input voltage: 3 V to 5.5 V
          efficiency: 92.0%
          loads: none
          total: 0 mA (0 mW)
        ");
    }
}

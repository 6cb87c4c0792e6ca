use std::fmt;
use std::sync::Arc;

use itertools::Itertools;

use crate::component::Component;
use crate::error::PowerError;
use crate::load::{self, Load};
use crate::supply::PowerSupply;

/// A named collection of loads and the supplies available to power them.
///
/// The two lists are independent; nothing checks that the loads fit the
/// supplies.
#[derive(Clone, Debug, Default)]
pub struct PowerBudget {
    name: String,
    components: Vec<Load>,
    power_supplies: Vec<PowerSupply>,
}

impl PowerBudget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn components(&self) -> &[Load] {
        &self.components
    }

    pub fn power_supplies(&self) -> &[PowerSupply] {
        &self.power_supplies
    }

    pub fn power_supply_mut(&mut self, index: usize) -> Result<&mut PowerSupply, PowerError> {
        PowerError::check_index(index, self.power_supplies.len())?;
        Ok(&mut self.power_supplies[index])
    }

    pub fn add_component(&mut self, component: impl Into<Arc<Component>>, multiplicity: u32) {
        self.components.push(Load::new(component, multiplicity));
    }

    pub fn remove_component(&mut self, index: usize) -> Result<Load, PowerError> {
        PowerError::check_index(index, self.components.len())?;
        Ok(self.components.remove(index))
    }

    pub fn add_power_supply(&mut self, supply: PowerSupply) {
        self.power_supplies.push(supply);
    }

    pub fn remove_power_supply(&mut self, index: usize) -> Result<PowerSupply, PowerError> {
        PowerError::check_index(index, self.power_supplies.len())?;
        Ok(self.power_supplies.remove(index))
    }

    /// Number of budgeted components counting multiplicities.
    pub fn total_components(&self) -> u64 {
        load::count(&self.components)
    }
}

impl fmt::Display for PowerBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Power budget: {}", self.name)?;
        writeln!(f, "  components ({}):", self.total_components())?;
        for load in &self.components {
            writeln!(f, "    - {load}")?;
        }
        write!(
            f,
            "  power supplies: {}",
            self.power_supplies.iter().map(PowerSupply::name).join(", ")
        )
    }
}

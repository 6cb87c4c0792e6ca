//! Electrical loads, power supplies and power budgets built on
//! [`ampere_units`] quantities.
//!
//! A [`Component`] knows its voltage, current and power, deriving whichever
//! one was not given. A [`PowerSupply`] (battery, linear regulator or DC-DC
//! converter) keeps a list of component [`Load`]s and rolls up the total
//! current and power drawn from it. A [`PowerBudget`] collects loads and
//! supplies for a whole design.

pub mod ac;
pub mod budget;
pub mod component;
pub mod error;
pub mod load;
pub mod supply;

pub use ac::AcVoltage;
pub use budget::PowerBudget;
pub use component::Component;
pub use error::PowerError;
pub use load::Load;
pub use supply::{
    Battery, LEAD_ACID_CELL_VOLTAGE, LithiumChemistry, PowerSupply, Regulator, SupplyKind,
    Topology,
};

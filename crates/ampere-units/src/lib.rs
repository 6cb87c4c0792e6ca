//! Dimensional quantities with unit conversion.
//!
//! A [`Quantity`] couples a value with a [`Unit`] and a [`QuantityKind`].
//! Units carry a [`Dimensions`] vector over the seven SI base dimensions with
//! rational exponents, so `m^(1/2)` squared is exactly `m` again.
//!
//! Conversions between units of the same kind go through a per-kind
//! [`ConversionManager`]. Most kinds use a linear table of factors relative to
//! the kind's base unit; temperature uses an affine table (`scale`, `offset`).
//! Tables come from a [`ConversionTableProvider`]: the built-in catalog, a
//! directory of JSON files, or a [`LayeredTables`] stack configured through
//! [`UnitsConfig`].
//!
//! ```
//! use ampere_units::{Quantity, QuantityKind};
//!
//! let v = Quantity::voltage(5.0);
//! let i = Quantity::in_unit(QuantityKind::Current, 10.0, "mA").unwrap();
//! let p = v.multiply(&i);
//! assert_eq!(p.kind(), QuantityKind::Power);
//! assert_eq!(p.unit().symbol(), "V*mA");
//! assert!((p.value_in("mW").unwrap() - 50.0).abs() < 1e-9);
//! ```

mod catalog;
pub mod config;
pub mod conversion;
pub mod dimensions;
pub mod error;
pub mod kind;
pub mod provider;
pub mod quantity;
pub mod rational;
pub mod record;
pub mod unit;

pub use config::UnitsConfig;
pub use conversion::{
    AffineFactor, ConversionManager, ConversionRegistry, ConversionTable, ConversionTableProvider,
};
pub use dimensions::{BaseDimension, Dimensions};
pub use error::{ParseError, QuantityError};
pub use kind::QuantityKind;
pub use provider::{BuiltinTables, JsonDirectoryTables, LayeredTables};
pub use quantity::Quantity;
pub use rational::Rational;
pub use record::QuantityRecord;
pub use unit::Unit;

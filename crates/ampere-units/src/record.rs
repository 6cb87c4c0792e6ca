//! Flat `(kind, value, unit symbol)` form of a [`Quantity`] for storage.

use serde::{Deserialize, Serialize};

use crate::dimensions::Dimensions;
use crate::error::QuantityError;
use crate::kind::QuantityKind;
use crate::quantity::Quantity;
use crate::unit::Unit;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantityRecord {
    pub kind: QuantityKind,
    pub value: f64,
    pub unit: String,
    /// Only present for units outside the catalog, such as composites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// Factor to the coherent SI unit, for non-catalog units that know it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl From<Quantity> for QuantityRecord {
    fn from(quantity: Quantity) -> Self {
        let unit = quantity.unit();
        let in_catalog = Unit::lookup(quantity.kind(), unit.symbol()).is_some();
        QuantityRecord {
            kind: quantity.kind(),
            value: quantity.value(),
            unit: unit.symbol().to_string(),
            dimensions: (!in_catalog).then(|| unit.dimensions().clone()),
            scale: if in_catalog { None } else { unit.scale() },
        }
    }
}

impl TryFrom<QuantityRecord> for Quantity {
    type Error = QuantityError;

    fn try_from(record: QuantityRecord) -> Result<Self, Self::Error> {
        if let Some(unit) = Unit::lookup(record.kind, &record.unit) {
            return Ok(Quantity::from_parts(record.kind, record.value, unit));
        }
        match record.dimensions {
            Some(dims) => {
                let mut unit = Unit::new(record.unit.clone(), record.unit, dims);
                if let Some(scale) = record.scale {
                    unit = unit.with_scale(scale);
                }
                Quantity::new(record.kind, record.value, unit)
            }
            None => Err(QuantityError::unknown_unit(record.kind.key(), record.unit)),
        }
    }
}

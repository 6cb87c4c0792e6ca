use ampere_units::{Quantity, QuantityError, QuantityKind};

#[derive(Debug, thiserror::Error)]
pub enum PowerError {
    #[error("Invalid construction: {0}")]
    InvalidConstruction(String),
    #[error("Index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Quantity(#[from] QuantityError),
}

impl PowerError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        PowerError::InvalidConstruction(reason.into())
    }

    pub(crate) fn check_index(index: usize, len: usize) -> Result<(), PowerError> {
        if index < len {
            Ok(())
        } else {
            Err(PowerError::IndexOutOfRange { index, len })
        }
    }
}

pub(crate) fn expect_kind(quantity: &Quantity, expected: QuantityKind) -> Result<(), QuantityError> {
    if quantity.kind() == expected {
        Ok(())
    } else {
        Err(QuantityError::IncompatibleQuantityKind {
            expected,
            actual: quantity.kind(),
        })
    }
}

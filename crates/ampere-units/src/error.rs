use crate::kind::QuantityKind;

/// Failure to parse the textual form of an exponent, dimension vector or unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
    #[error("Zero denominator in '{0}'")]
    ZeroDenominator(String),
    #[error("Invalid dimension symbol '{0}'")]
    InvalidDimension(String),
    #[error("Unknown quantity kind '{0}'")]
    UnknownKind(String),
}

#[derive(Debug, thiserror::Error)]
pub enum QuantityError {
    #[error("Unknown {kind} unit '{symbol}'")]
    UnknownUnit { kind: String, symbol: String },
    #[error("Incompatible units: {lhs} and {rhs}")]
    IncompatibleUnits { lhs: String, rhs: String },
    #[error("Cannot combine {actual} with {expected}")]
    IncompatibleQuantityKind {
        expected: QuantityKind,
        actual: QuantityKind,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("No conversion table for '{kind}'")]
    MissingTable { kind: String },
    #[error("Invalid conversion table for '{kind}': {reason}")]
    InvalidTable { kind: String, reason: String },
    #[error("Exponent overflow in {0}")]
    ExponentOverflow(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl QuantityError {
    pub(crate) fn unknown_unit(kind: impl Into<String>, symbol: impl Into<String>) -> Self {
        QuantityError::UnknownUnit {
            kind: kind.into(),
            symbol: symbol.into(),
        }
    }

    pub(crate) fn invalid_table(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        QuantityError::InvalidTable {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

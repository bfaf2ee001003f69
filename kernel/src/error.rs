//! Error types for the kernel.

use crate::schema::DataType;

/// A convenience alias for kernel results.
pub type KernelResult<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the kernel's fallible entry points.
///
/// Note that expression conversion itself is not fallible in this sense: an
/// unconvertible filter is a missed optimization, reported as `None`, not an
/// error. `Error` covers genuine input mistakes such as a static filter
/// configuration naming an unknown field.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A field name that does not exist in the row schema.
    #[error("unknown field: '{0}'")]
    UnknownField(String),

    /// A textual literal that cannot be parsed as the target type.
    #[error("cannot parse '{text}' as {to}")]
    InvalidLiteral {
        /// The offending literal text.
        text: String,
        /// The type the text was expected to parse as.
        to: DataType,
    },

    /// Decimal precision or scale outside the supported range.
    #[error("invalid decimal: precision {precision}, scale {scale}")]
    InvalidDecimal {
        /// Requested precision.
        precision: u8,
        /// Requested scale.
        scale: u8,
    },

    /// An uncategorized error with a message.
    #[error("{0}")]
    Generic(String),
}

impl Error {
    pub fn unknown_field(name: impl ToString) -> Self {
        Self::UnknownField(name.to_string())
    }

    pub fn invalid_literal(text: impl ToString, to: &DataType) -> Self {
        Self::InvalidLiteral {
            text: text.to_string(),
            to: to.clone(),
        }
    }

    pub fn generic(msg: impl ToString) -> Self {
        Self::Generic(msg.to_string())
    }
}

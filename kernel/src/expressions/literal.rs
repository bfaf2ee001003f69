//! Source literal values, as produced by the expression resolver.

use std::fmt::{Display, Formatter};

use crate::cast::parse_decimal;
use crate::datum::{format_date, format_time, format_timestamp, Datum};
use crate::schema::{DataType, PrimitiveType};

/// A resolved literal in its source representation.
///
/// This is what the planner hands over, not what the storage layer compares
/// with: predicate construction converts a `LiteralValue` into a [`Datum`]
/// against the declared type of the field it is compared to.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Boolean(bool),
    /// Any integer literal, regardless of the declared width.
    Integer(i64),
    Float(f64),
    /// A decimal literal in its exact textual form.
    Decimal(String),
    Text(String),
    Bytes(Vec<u8>),
    /// Days since the Unix epoch.
    Date(i32),
    /// Milliseconds since midnight.
    Time(i32),
    /// Microseconds since the Unix epoch.
    Timestamp(i64),
    /// A month count or millisecond count, depending on the declared interval
    /// type.
    Interval(i64),
}

impl LiteralValue {
    /// Converts this literal to the internal representation, typed as
    /// `expected`. Returns `None` when the value does not fit the type (an
    /// out-of-range integer, a decimal that overflows the declared precision,
    /// a value/type mismatch).
    pub fn to_datum(&self, expected: &DataType) -> Option<Datum> {
        use PrimitiveType::*;
        let DataType::Primitive(ptype) = expected else {
            return None;
        };
        match (self, ptype) {
            (Self::Boolean(b), Boolean) => Some(Datum::Boolean(*b)),
            (Self::Integer(i), TinyInt) => i8::try_from(*i).ok().map(Datum::TinyInt),
            (Self::Integer(i), SmallInt) => i16::try_from(*i).ok().map(Datum::SmallInt),
            (Self::Integer(i), Int) => i32::try_from(*i).ok().map(Datum::Int),
            (Self::Integer(i), BigInt) => Some(Datum::BigInt(*i)),
            (Self::Integer(i), Decimal { precision, scale }) => {
                let unscaled =
                    i128::from(*i).checked_mul(10i128.checked_pow(u32::from(*scale))?)?;
                crate::datum::DecimalData::try_new(unscaled, *precision, *scale)
                    .ok()
                    .map(Datum::Decimal)
            }
            (Self::Float(v), Float) => Some(Datum::Float(*v as f32)),
            (Self::Float(v), Double) => Some(Datum::Double(*v)),
            (Self::Decimal(text), Decimal { precision, scale }) => {
                parse_decimal(text, *precision, *scale).map(Datum::Decimal)
            }
            (Self::Text(s), Char { .. } | VarChar { .. }) => Some(Datum::Text(s.clone())),
            (Self::Bytes(b), Binary { .. } | VarBinary { .. }) => Some(Datum::Bytes(b.clone())),
            (Self::Date(d), Date) => Some(Datum::Date(*d)),
            (Self::Time(t), Time) => Some(Datum::Time(*t)),
            (Self::Timestamp(ts), Timestamp) => Some(Datum::Timestamp(*ts)),
            (Self::Timestamp(ts), TimestampTz) => Some(Datum::TimestampTz(*ts)),
            (Self::Interval(v), IntervalYearMonth) => {
                i32::try_from(*v).ok().map(Datum::IntervalYearMonth)
            }
            (Self::Interval(v), IntervalDayTime) => Some(Datum::IntervalDayTime(*v)),
            _ => None,
        }
    }

    /// The canonical text rendering used for implicit-cast round trips.
    pub fn render_text(&self) -> String {
        match self {
            Self::Boolean(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Decimal(text) => text.clone(),
            Self::Text(s) => s.clone(),
            Self::Bytes(b) => b.iter().map(|byte| format!("{byte:02x}")).collect(),
            Self::Date(d) => format_date(*d),
            Self::Time(t) => format_time(*t),
            Self::Timestamp(ts) => format_timestamp(*ts),
            Self::Interval(v) => v.to_string(),
        }
    }
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Bytes(_) => write!(f, "X'{}'", self.render_text()),
            _ => write!(f, "{}", self.render_text()),
        }
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for LiteralValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

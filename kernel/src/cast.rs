//! Pluggable literal coercion.
//!
//! The converter never guesses at casts: when a literal's declared type does
//! not match the field it is compared against, the surrounding type system
//! decides whether an implicit widening cast exists, and performs it by
//! rendering the literal as text and re-parsing it as the target type. That
//! capability is modeled by [`TypeCoercion`] so the predicate kernel stays
//! decoupled from the full casting matrix; [`StandardCoercion`] implements the
//! table store's default rules.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::datum::{Datum, DecimalData};
use crate::schema::{DataType, PrimitiveType};

/// The type-coercion capability supplied by the surrounding type system.
pub trait TypeCoercion {
    /// True if an implicit (lossless, widening) cast exists from `from` to
    /// `to`.
    fn supports_implicit_cast(&self, from: &DataType, to: &DataType) -> bool;

    /// Parses `text` as a value of type `to`. Returns `None` on any parse
    /// failure; coercion failures are never errors, they only make the
    /// enclosing expression unconvertible.
    fn cast_from_text(&self, text: &str, to: &DataType) -> Option<Datum>;
}

/// The default coercion rules: integer widening, integer and float promotion
/// to approximate and exact numerics, `CHAR` to `VARCHAR`, `BINARY` to
/// `VARBINARY`, and `TIMESTAMP` to `TIMESTAMP_TZ`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCoercion;

impl TypeCoercion for StandardCoercion {
    fn supports_implicit_cast(&self, from: &DataType, to: &DataType) -> bool {
        use PrimitiveType::*;
        let (DataType::Primitive(from), DataType::Primitive(to)) = (from, to) else {
            return false;
        };
        if std::mem::discriminant(from) == std::mem::discriminant(to) {
            return true;
        }
        matches!(
            (from, to),
            (TinyInt, SmallInt | Int | BigInt)
                | (SmallInt, Int | BigInt)
                | (Int, BigInt)
                | (TinyInt | SmallInt | Int | BigInt, Decimal { .. } | Float | Double)
                | (Float, Double)
                | (Decimal { .. }, Float | Double)
                | (Char { .. }, VarChar { .. })
                | (Binary { .. }, VarBinary { .. })
                | (Timestamp, TimestampTz)
        )
    }

    fn cast_from_text(&self, text: &str, to: &DataType) -> Option<Datum> {
        use PrimitiveType::*;
        let DataType::Primitive(ptype) = to else {
            return None;
        };
        let text = text.trim();
        match ptype {
            Boolean => match text.to_ascii_lowercase().as_str() {
                "true" => Some(Datum::Boolean(true)),
                "false" => Some(Datum::Boolean(false)),
                _ => None,
            },
            TinyInt => text.parse().ok().map(Datum::TinyInt),
            SmallInt => text.parse().ok().map(Datum::SmallInt),
            Int => text.parse().ok().map(Datum::Int),
            BigInt => text.parse().ok().map(Datum::BigInt),
            Float => text.parse().ok().map(Datum::Float),
            Double => text.parse().ok().map(Datum::Double),
            Decimal { precision, scale } => {
                parse_decimal(text, *precision, *scale).map(Datum::Decimal)
            }
            Char { .. } | VarChar { .. } => Some(Datum::Text(text.to_string())),
            Binary { .. } | VarBinary { .. } => Some(Datum::Bytes(text.as_bytes().to_vec())),
            Date => {
                let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
                i32::try_from((date - epoch).num_days())
                    .ok()
                    .map(Datum::Date)
            }
            Time => {
                let time = NaiveTime::parse_from_str(text, "%H:%M:%S%.f").ok()?;
                let millis = time.num_seconds_from_midnight() * 1000 + time.nanosecond() / 1_000_000;
                i32::try_from(millis).ok().map(Datum::Time)
            }
            Timestamp => parse_timestamp_micros(text).map(Datum::Timestamp),
            TimestampTz => parse_timestamp_micros(text).map(Datum::TimestampTz),
            IntervalYearMonth => text.parse().ok().map(Datum::IntervalYearMonth),
            IntervalDayTime => text.parse().ok().map(Datum::IntervalDayTime),
        }
    }
}

fn parse_timestamp_micros(text: &str) -> Option<i64> {
    let ts = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Some(ts.and_utc().timestamp_micros())
}

/// Parses decimal text into an unscaled value at exactly the target scale.
/// More fractional digits than the scale allows is a parse failure, not a
/// rounding.
pub(crate) fn parse_decimal(text: &str, precision: u8, scale: u8) -> Option<DecimalData> {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1i128, rest),
        None => (1i128, text.strip_prefix('+').unwrap_or(text)),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if frac_part.len() > usize::from(scale) {
        return None;
    }
    let mut unscaled: i128 = 0;
    for c in int_part.chars().chain(frac_part.chars()) {
        let digit = c.to_digit(10)?;
        unscaled = unscaled.checked_mul(10)?.checked_add(i128::from(digit))?;
    }
    // Scale up for any fractional digits the text left off.
    let missing = u32::from(scale) - frac_part.len() as u32;
    unscaled = unscaled.checked_mul(10i128.checked_pow(missing)?)?;
    DecimalData::try_new(sign * unscaled, precision, scale).ok()
}

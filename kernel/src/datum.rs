//! The storage layer's internal value representation.
//!
//! A [`Datum`] is the canonical in-memory encoding the storage engine compares
//! against file statistics. Predicates only ever hold `Datum`s: source
//! literals are converted exactly once, when a predicate leaf is built, and
//! never lazily.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use crate::error::{Error, KernelResult};
use crate::schema::DataType;

/// Maximum supported decimal precision.
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// An exact decimal value: an unscaled integer plus precision and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimalData {
    unscaled: i128,
    precision: u8,
    scale: u8,
}

impl DecimalData {
    /// Creates a decimal, validating that precision and scale are in range and
    /// that the unscaled value fits the precision.
    pub fn try_new(unscaled: i128, precision: u8, scale: u8) -> KernelResult<Self> {
        if precision == 0 || precision > MAX_DECIMAL_PRECISION || scale > precision {
            return Err(Error::InvalidDecimal { precision, scale });
        }
        if unscaled.unsigned_abs() >= 10u128.pow(u32::from(precision)) {
            return Err(Error::InvalidDecimal { precision, scale });
        }
        Ok(Self {
            unscaled,
            precision,
            scale,
        })
    }

    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }
}

impl PartialOrd for DecimalData {
    /// Decimals are comparable only at equal scale.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (self.scale == other.scale).then(|| self.unscaled.cmp(&other.unscaled))
    }
}

impl Display for DecimalData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.unscaled);
        }
        let factor = 10i128.pow(u32::from(self.scale));
        let sign = if self.unscaled < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}{}.{:0width$}",
            (self.unscaled / factor).abs(),
            (self.unscaled % factor).unsigned_abs(),
            width = self.scale as usize
        )
    }
}

/// An internal value, typed to match its column's logical type.
///
/// `Null` carries the logical type it was declared with, so a null operand
/// stays typed through predicate construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Decimal(DecimalData),
    Text(String),
    Bytes(Vec<u8>),
    /// Days since the Unix epoch.
    Date(i32),
    /// Milliseconds since midnight.
    Time(i32),
    /// Microseconds since the Unix epoch, no time zone.
    Timestamp(i64),
    /// Microseconds since the Unix epoch, with time zone.
    TimestampTz(i64),
    /// Months.
    IntervalYearMonth(i32),
    /// Milliseconds.
    IntervalDayTime(i64),
    Null(DataType),
}

impl Datum {
    /// The logical type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Datum::Boolean(_) => DataType::BOOLEAN,
            Datum::TinyInt(_) => DataType::TINYINT,
            Datum::SmallInt(_) => DataType::SMALLINT,
            Datum::Int(_) => DataType::INT,
            Datum::BigInt(_) => DataType::BIGINT,
            Datum::Float(_) => DataType::FLOAT,
            Datum::Double(_) => DataType::DOUBLE,
            Datum::Decimal(d) => DataType::decimal(d.precision(), d.scale()),
            Datum::Text(_) => DataType::STRING,
            Datum::Bytes(_) => DataType::BYTES,
            Datum::Date(_) => DataType::DATE,
            Datum::Time(_) => DataType::TIME,
            Datum::Timestamp(_) => DataType::TIMESTAMP,
            Datum::TimestampTz(_) => DataType::TIMESTAMP_TZ,
            Datum::IntervalYearMonth(_) => DataType::INTERVAL_YEAR_MONTH,
            Datum::IntervalDayTime(_) => DataType::INTERVAL_DAY_TIME,
            Datum::Null(data_type) => data_type.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null(_))
    }
}

impl PartialOrd for Datum {
    /// Values of different types are incomparable, as is `Null` against
    /// anything (including another `Null`).
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use Datum::*;
        match (self, other) {
            (Boolean(a), Boolean(b)) => a.partial_cmp(b),
            (TinyInt(a), TinyInt(b)) => a.partial_cmp(b),
            (SmallInt(a), SmallInt(b)) => a.partial_cmp(b),
            (Int(a), Int(b)) => a.partial_cmp(b),
            (BigInt(a), BigInt(b)) => a.partial_cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Double(a), Double(b)) => a.partial_cmp(b),
            (Decimal(a), Decimal(b)) => a.partial_cmp(b),
            (Text(a), Text(b)) => a.partial_cmp(b),
            (Bytes(a), Bytes(b)) => a.partial_cmp(b),
            (Date(a), Date(b)) => a.partial_cmp(b),
            (Time(a), Time(b)) => a.partial_cmp(b),
            (Timestamp(a), Timestamp(b)) => a.partial_cmp(b),
            (TimestampTz(a), TimestampTz(b)) => a.partial_cmp(b),
            (IntervalYearMonth(a), IntervalYearMonth(b)) => a.partial_cmp(b),
            (IntervalDayTime(a), IntervalDayTime(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl Display for Datum {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use Datum::*;
        match self {
            Boolean(b) => write!(f, "{b}"),
            TinyInt(i) => write!(f, "{i}"),
            SmallInt(i) => write!(f, "{i}"),
            Int(i) => write!(f, "{i}"),
            BigInt(i) => write!(f, "{i}"),
            Float(v) => write!(f, "{v}"),
            Double(v) => write!(f, "{v}"),
            Decimal(d) => write!(f, "{d}"),
            Text(s) => write!(f, "'{s}'"),
            Bytes(b) => {
                write!(f, "X'")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                write!(f, "'")
            }
            Date(days) => write!(f, "{}", format_date(*days)),
            Time(millis) => write!(f, "{}", format_time(*millis)),
            Timestamp(micros) | TimestampTz(micros) => {
                write!(f, "{}", format_timestamp(*micros))
            }
            IntervalYearMonth(months) => write!(f, "INTERVAL {months} MONTHS"),
            IntervalDayTime(millis) => write!(f, "INTERVAL {millis} MILLIS"),
            Null(_) => write!(f, "NULL"),
        }
    }
}

/// Renders days-since-epoch as an ISO date, falling back to the raw count when
/// out of chrono's range.
pub(crate) fn format_date(days: i32) -> String {
    match chrono::DateTime::from_timestamp(i64::from(days) * 86_400, 0) {
        Some(ts) => ts.format("%Y-%m-%d").to_string(),
        None => days.to_string(),
    }
}

/// Renders millis-since-midnight as `HH:MM:SS[.mmm]`.
pub(crate) fn format_time(millis: i32) -> String {
    let secs = millis / 1000;
    let mut out = format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60);
    if millis % 1000 != 0 {
        out.push_str(&format!(".{:03}", millis % 1000));
    }
    out
}

/// Renders micros-since-epoch as an ISO timestamp.
pub(crate) fn format_timestamp(micros: i64) -> String {
    match chrono::DateTime::from_timestamp_micros(micros) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        None => micros.to_string(),
    }
}

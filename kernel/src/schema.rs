//! Logical types and row schemas.
//!
//! A [`RowType`] is the resolved schema a filter expression was bound against:
//! an ordered list of named, typed fields addressed by a stable 0-based index.
//! [`DataType`] models the table store's logical type system; only primitive
//! types are eligible for storage-level predicates.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A primitive logical type. Every primitive type is eligible for predicate
/// pushdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveType {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal {
        precision: u8,
        scale: u8,
    },
    Char {
        length: u32,
    },
    VarChar {
        length: u32,
    },
    Binary {
        length: u32,
    },
    VarBinary {
        length: u32,
    },
    Date,
    Time,
    /// Timestamp without time zone, microsecond precision.
    Timestamp,
    /// Timestamp with time zone, microsecond precision.
    TimestampTz,
    /// Year-month interval, stored as a month count.
    IntervalYearMonth,
    /// Day-time interval, stored as a millisecond count.
    IntervalDayTime,
}

/// A logical data type: a primitive, or a nested container type.
///
/// Container types exist in schemas but are never pushdown-eligible; a
/// comparison against an array, map, or row column always falls back to full
/// evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    Primitive(PrimitiveType),
    Array(Box<DataType>),
    Map(Box<DataType>, Box<DataType>),
    Row(Vec<DataField>),
}

impl DataType {
    pub const BOOLEAN: Self = DataType::Primitive(PrimitiveType::Boolean);
    pub const TINYINT: Self = DataType::Primitive(PrimitiveType::TinyInt);
    pub const SMALLINT: Self = DataType::Primitive(PrimitiveType::SmallInt);
    pub const INT: Self = DataType::Primitive(PrimitiveType::Int);
    pub const BIGINT: Self = DataType::Primitive(PrimitiveType::BigInt);
    pub const FLOAT: Self = DataType::Primitive(PrimitiveType::Float);
    pub const DOUBLE: Self = DataType::Primitive(PrimitiveType::Double);
    /// An unbounded character string (`VARCHAR` of maximum length).
    pub const STRING: Self = DataType::Primitive(PrimitiveType::VarChar { length: u32::MAX });
    /// An unbounded byte string (`VARBINARY` of maximum length).
    pub const BYTES: Self = DataType::Primitive(PrimitiveType::VarBinary { length: u32::MAX });
    pub const DATE: Self = DataType::Primitive(PrimitiveType::Date);
    pub const TIME: Self = DataType::Primitive(PrimitiveType::Time);
    pub const TIMESTAMP: Self = DataType::Primitive(PrimitiveType::Timestamp);
    pub const TIMESTAMP_TZ: Self = DataType::Primitive(PrimitiveType::TimestampTz);
    pub const INTERVAL_YEAR_MONTH: Self =
        DataType::Primitive(PrimitiveType::IntervalYearMonth);
    pub const INTERVAL_DAY_TIME: Self = DataType::Primitive(PrimitiveType::IntervalDayTime);

    pub fn decimal(precision: u8, scale: u8) -> Self {
        DataType::Primitive(PrimitiveType::Decimal { precision, scale })
    }

    pub fn char(length: u32) -> Self {
        DataType::Primitive(PrimitiveType::Char { length })
    }

    pub fn varchar(length: u32) -> Self {
        DataType::Primitive(PrimitiveType::VarChar { length })
    }

    /// True if values of this type can appear in a storage predicate.
    ///
    /// This is the pushdown allowlist: every primitive type qualifies, nested
    /// container types never do.
    pub fn supports_pushdown(&self) -> bool {
        match self {
            DataType::Primitive(_) => true,
            DataType::Array(_) | DataType::Map(_, _) | DataType::Row(_) => false,
        }
    }

    /// True for the character-string family (`CHAR`, `VARCHAR`).
    pub fn is_character_string(&self) -> bool {
        matches!(
            self,
            DataType::Primitive(PrimitiveType::Char { .. })
                | DataType::Primitive(PrimitiveType::VarChar { .. })
        )
    }

    /// True if `self` and `other` share a type root, ignoring type parameters
    /// such as lengths and decimal precision.
    pub fn same_root(&self, other: &DataType) -> bool {
        match (self, other) {
            (DataType::Primitive(a), DataType::Primitive(b)) => {
                std::mem::discriminant(a) == std::mem::discriminant(b)
            }
            _ => false,
        }
    }
}

impl From<PrimitiveType> for DataType {
    fn from(ptype: PrimitiveType) -> Self {
        DataType::Primitive(ptype)
    }
}

/// A named, typed field of a [`RowType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    pub name: String,
    pub data_type: DataType,
}

impl DataField {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered row schema. Field names are unique; fields are addressed by
/// their 0-based position, which is stable for the lifetime of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowType {
    fields: Vec<DataField>,
}

impl RowType {
    pub fn new(fields: impl IntoIterator<Item = DataField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn fields(&self) -> &[DataField] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&DataField> {
        self.fields.get(index)
    }

    /// The index of the field with the given name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use PrimitiveType::*;
        match self {
            Boolean => write!(f, "BOOLEAN"),
            TinyInt => write!(f, "TINYINT"),
            SmallInt => write!(f, "SMALLINT"),
            Int => write!(f, "INT"),
            BigInt => write!(f, "BIGINT"),
            Float => write!(f, "FLOAT"),
            Double => write!(f, "DOUBLE"),
            Decimal { precision, scale } => write!(f, "DECIMAL({precision}, {scale})"),
            Char { length } => write!(f, "CHAR({length})"),
            VarChar { length } if *length == u32::MAX => write!(f, "STRING"),
            VarChar { length } => write!(f, "VARCHAR({length})"),
            Binary { length } => write!(f, "BINARY({length})"),
            VarBinary { length } if *length == u32::MAX => write!(f, "BYTES"),
            VarBinary { length } => write!(f, "VARBINARY({length})"),
            Date => write!(f, "DATE"),
            Time => write!(f, "TIME"),
            Timestamp => write!(f, "TIMESTAMP"),
            TimestampTz => write!(f, "TIMESTAMP_TZ"),
            IntervalYearMonth => write!(f, "INTERVAL YEAR TO MONTH"),
            IntervalDayTime => write!(f, "INTERVAL DAY TO SECOND"),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Primitive(ptype) => write!(f, "{ptype}"),
            DataType::Array(element) => write!(f, "ARRAY<{element}>"),
            DataType::Map(key, value) => write!(f, "MAP<{key}, {value}>"),
            DataType::Row(fields) => {
                let fields = fields
                    .iter()
                    .map(|field| format!("{} {}", field.name, field.data_type))
                    .join(", ");
                write!(f, "ROW<{fields}>")
            }
        }
    }
}

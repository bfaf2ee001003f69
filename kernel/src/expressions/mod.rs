//! Resolved filter expression trees.
//!
//! An [`Expression`] is the input contract of predicate conversion: a fully
//! type-resolved tree produced by an upstream planner. Field references are
//! already bound to schema indexes and literals carry their declared types, so
//! no name resolution or type inference happens on this side.

use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::schema::DataType;

mod literal;

pub use literal::LiteralValue;

/// The closed set of functions a resolved filter can call.
///
/// Conversion matches this enum exhaustively: adding an operator forces an
/// explicit decision to support it or defer it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarFunction {
    And,
    Or,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    IsNull,
    IsNotNull,
    Like,
    // Resolvable upstream, never convertible to a storage predicate.
    Not,
    Between,
    SimilarTo,
    NotIn,
    Cast,
    Plus,
    Minus,
    Multiply,
    Divide,
}

/// A function application over child expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub function: ScalarFunction,
    pub children: Vec<Expression>,
}

/// A reference to a schema field by its stable 0-based index.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRefExpression {
    pub index: usize,
    pub data_type: DataType,
}

/// A literal with its declared type. `value` is `None` for a typed `NULL`
/// literal.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpression {
    pub data_type: DataType,
    pub value: Option<LiteralValue>,
}

impl LiteralExpression {
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

/// A resolved filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Call(CallExpression),
    FieldRef(FieldRefExpression),
    Literal(LiteralExpression),
    /// A type used at value position (e.g. the target of a CAST). Never
    /// convertible.
    TypeLiteral(DataType),
}

impl Expression {
    /// A reference to the field at `index`, declared as `data_type`.
    pub fn field(index: usize, data_type: DataType) -> Self {
        Self::FieldRef(FieldRefExpression { index, data_type })
    }

    /// A literal of the given declared type.
    pub fn literal(data_type: DataType, value: impl Into<LiteralValue>) -> Self {
        Self::Literal(LiteralExpression {
            data_type,
            value: Some(value.into()),
        })
    }

    /// A typed `NULL` literal.
    pub fn null_literal(data_type: DataType) -> Self {
        Self::Literal(LiteralExpression {
            data_type,
            value: None,
        })
    }

    /// A function call over the given children.
    pub fn call(function: ScalarFunction, children: impl IntoIterator<Item = Self>) -> Self {
        Self::Call(CallExpression {
            function,
            children: children.into_iter().collect(),
        })
    }

    pub fn and(left: impl Into<Self>, right: impl Into<Self>) -> Self {
        Self::call(ScalarFunction::And, [left.into(), right.into()])
    }

    pub fn or(left: impl Into<Self>, right: impl Into<Self>) -> Self {
        Self::call(ScalarFunction::Or, [left.into(), right.into()])
    }

    pub fn eq(self, other: impl Into<Self>) -> Self {
        Self::call(ScalarFunction::Equal, [self, other.into()])
    }

    pub fn ne(self, other: impl Into<Self>) -> Self {
        Self::call(ScalarFunction::NotEqual, [self, other.into()])
    }

    pub fn gt(self, other: impl Into<Self>) -> Self {
        Self::call(ScalarFunction::GreaterThan, [self, other.into()])
    }

    pub fn ge(self, other: impl Into<Self>) -> Self {
        Self::call(ScalarFunction::GreaterThanOrEqual, [self, other.into()])
    }

    pub fn lt(self, other: impl Into<Self>) -> Self {
        Self::call(ScalarFunction::LessThan, [self, other.into()])
    }

    pub fn le(self, other: impl Into<Self>) -> Self {
        Self::call(ScalarFunction::LessThanOrEqual, [self, other.into()])
    }

    pub fn in_list(self, items: impl IntoIterator<Item = Self>) -> Self {
        Self::call(
            ScalarFunction::In,
            std::iter::once(self).chain(items).collect::<Vec<_>>(),
        )
    }

    pub fn is_null(self) -> Self {
        Self::call(ScalarFunction::IsNull, [self])
    }

    pub fn is_not_null(self) -> Self {
        Self::call(ScalarFunction::IsNotNull, [self])
    }

    pub fn like(self, pattern: impl Into<Self>) -> Self {
        Self::call(ScalarFunction::Like, [self, pattern.into()])
    }

    pub fn like_escape(self, pattern: impl Into<Self>, escape: impl Into<Self>) -> Self {
        Self::call(ScalarFunction::Like, [self, pattern.into(), escape.into()])
    }

    /// This expression as a field reference, if it is one.
    pub fn as_field_ref(&self) -> Option<&FieldRefExpression> {
        match self {
            Expression::FieldRef(field) => Some(field),
            _ => None,
        }
    }
}

impl Display for ScalarFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use ScalarFunction::*;
        let name = match self {
            And => "AND",
            Or => "OR",
            Equal => "=",
            NotEqual => "!=",
            GreaterThan => ">",
            GreaterThanOrEqual => ">=",
            LessThan => "<",
            LessThanOrEqual => "<=",
            In => "IN",
            IsNull => "IS NULL",
            IsNotNull => "IS NOT NULL",
            Like => "LIKE",
            Not => "NOT",
            Between => "BETWEEN",
            SimilarTo => "SIMILAR TO",
            NotIn => "NOT IN",
            Cast => "CAST",
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
        };
        write!(f, "{name}")
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use ScalarFunction::*;
        match self {
            Expression::FieldRef(field) => write!(f, "field#{}", field.index),
            Expression::Literal(literal) => match &literal.value {
                Some(value) => write!(f, "{value}"),
                None => write!(f, "NULL"),
            },
            Expression::TypeLiteral(data_type) => write!(f, "TYPE {data_type}"),
            Expression::Call(call) => match (call.function, call.children.as_slice()) {
                (And | Or, [left, right]) => {
                    write!(f, "{}({left}, {right})", call.function)
                }
                (
                    Equal | NotEqual | GreaterThan | GreaterThanOrEqual | LessThan
                    | LessThanOrEqual,
                    [left, right],
                ) => write!(f, "{left} {} {right}", call.function),
                (In, [first, rest @ ..]) => {
                    let items = rest.iter().map(|item| format!("{item}")).join(", ");
                    write!(f, "{first} IN ({items})")
                }
                (IsNull | IsNotNull, [child]) => write!(f, "{child} {}", call.function),
                (Like, [value, pattern]) => write!(f, "{value} LIKE {pattern}"),
                (Like, [value, pattern, escape]) => {
                    write!(f, "{value} LIKE {pattern} ESCAPE {escape}")
                }
                (function, children) => {
                    let children = children.iter().map(|child| format!("{child}")).join(", ");
                    write!(f, "{function}({children})")
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_format() {
        let age = || Expression::field(1, DataType::INT);
        let cases = [
            (age(), "field#1".to_string()),
            (
                age().ge(Expression::literal(DataType::INT, 18)),
                "field#1 >= 18".to_string(),
            ),
            (
                Expression::and(
                    age().ge(Expression::literal(DataType::INT, 18)),
                    Expression::field(2, DataType::STRING).is_not_null(),
                ),
                "AND(field#1 >= 18, field#2 IS NOT NULL)".to_string(),
            ),
            (
                age().in_list([
                    Expression::literal(DataType::INT, 1),
                    Expression::literal(DataType::INT, 2),
                ]),
                "field#1 IN (1, 2)".to_string(),
            ),
            (
                Expression::field(0, DataType::STRING)
                    .like(Expression::literal(DataType::STRING, "abc%")),
                "field#0 LIKE 'abc%'".to_string(),
            ),
            (
                Expression::null_literal(DataType::INT),
                "NULL".to_string(),
            ),
        ];
        for (expr, expected) in cases {
            assert_eq!(expr.to_string(), expected);
        }
    }

    #[test]
    fn test_literal_to_datum_widths() {
        use crate::datum::Datum;
        let value = LiteralValue::Integer(300);
        assert_eq!(value.to_datum(&DataType::TINYINT), None);
        assert_eq!(
            value.to_datum(&DataType::SMALLINT),
            Some(Datum::SmallInt(300))
        );
        assert_eq!(value.to_datum(&DataType::BIGINT), Some(Datum::BigInt(300)));
        assert_eq!(value.to_datum(&DataType::STRING), None);
        assert_eq!(LiteralValue::Text("x".into()).to_datum(&DataType::INT), None);
    }

    #[test]
    fn test_literal_to_datum_decimal() {
        use crate::datum::{Datum, DecimalData};
        assert_eq!(
            LiteralValue::Integer(5).to_datum(&DataType::decimal(10, 2)),
            Some(Datum::Decimal(DecimalData::try_new(500, 10, 2).unwrap()))
        );
        assert_eq!(
            LiteralValue::Decimal("12.34".into()).to_datum(&DataType::decimal(10, 2)),
            Some(Datum::Decimal(DecimalData::try_new(1234, 10, 2).unwrap()))
        );
    }
}

//! Filter-pushdown predicate kernel for the Strata columnar table store.
//!
//! The kernel sits between a query planner and the file store: it translates a
//! resolved, typed boolean filter [`Expression`] into a normalized
//! [`Predicate`] tree the store evaluates against per-file statistics (min/max
//! values, null counts) to skip irrelevant files. Conversion only ever
//! narrows: a filter the kernel cannot express yields no predicate at all,
//! never an approximate one, so an unconvertible filter costs a full scan, not
//! correctness.
//!
//! ```
//! use strata_kernel::{convert, DataField, DataType, Expression, RowType};
//!
//! let schema = RowType::new([
//!     DataField::new("name", DataType::STRING),
//!     DataField::new("age", DataType::INT),
//! ]);
//! let filter = Expression::and(
//!     Expression::field(1, DataType::INT).ge(Expression::literal(DataType::INT, 18)),
//!     Expression::field(0, DataType::STRING).is_not_null(),
//! );
//! let predicate = convert(&schema, &filter).expect("convertible filter");
//! assert_eq!(predicate.to_string(), "AND(field#1 >= 18, field#0 IS NOT NULL)");
//! ```

pub mod cast;
pub mod datum;
pub mod error;
pub mod expressions;
pub mod predicate;
pub mod schema;

pub use crate::cast::{StandardCoercion, TypeCoercion};
pub use crate::datum::{Datum, DecimalData};
pub use crate::error::{Error, KernelResult};
pub use crate::expressions::{Expression, LiteralValue, ScalarFunction};
pub use crate::predicate::{
    convert, from_map, CompareOp, Predicate, PredicateBuilder, PredicateConverter,
};
pub use crate::schema::{DataField, DataType, PrimitiveType, RowType};

//! Query and mutation expressions consumed from the evaluator.
//!
//! The evaluator resolves every value before handing a statement over; this
//! module only describes shapes. Names stay as strings until the SQL
//! serializer validates them.

mod delete;
pub use delete::Delete;

mod expr;
pub use expr::{
    BinaryOp, Expr, ExprBetween, ExprBinaryOp, ExprInList, ExprInSubquery, ExprIsNull,
};

mod filter;
pub use filter::Filter;

mod insert;
pub use insert::{Insert, OnConflict};

mod query;
pub use query::{Aggregate, AggregateFunc, OrderBy, Query, Select};

mod statement;
pub use statement::{Statement, Terminal};

mod update;
pub use update::Update;

mod value;
pub use value::Value;

use indexmap::IndexMap;

/// Ordered column → value pairs, used for insert rows, update assignments
/// and filter maps.
pub type Assignments = IndexMap<String, Value>;

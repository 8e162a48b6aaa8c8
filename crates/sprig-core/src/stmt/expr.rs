use super::{Query, Value};

use indexmap::IndexMap;

/// A filter condition tree.
///
/// Column names are carried as plain strings because they come straight from
/// the evaluator; the SQL serializer validates each one as it is emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// All operands hold. An empty `And` is an empty filter.
    And(Vec<Expr>),

    /// At least one operand holds.
    Or(Vec<Expr>),

    Not(Box<Expr>),

    BinaryOp(ExprBinaryOp),

    InList(ExprInList),

    InSubquery(ExprInSubquery),

    Between(ExprBetween),

    IsNull(ExprIsNull),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprBinaryOp {
    pub column: String,
    pub op: BinaryOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprInList {
    pub column: String,
    pub list: Vec<Value>,
    pub negate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprInSubquery {
    pub column: String,
    pub query: Box<Query>,
    pub negate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprBetween {
    pub column: String,
    pub low: Value,
    pub high: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprIsNull {
    pub column: String,
    pub negate: bool,
}

impl BinaryOp {
    /// Parses the operator spellings the evaluator produces.
    pub fn parse(op: &str) -> Option<BinaryOp> {
        Some(match op {
            "=" | "==" => BinaryOp::Eq,
            "!=" | "<>" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            _ if op.eq_ignore_ascii_case("like") => BinaryOp::Like,
            _ => return None,
        })
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Like => "LIKE",
        }
    }
}

impl Expr {
    pub fn binary_op(column: impl Into<String>, op: BinaryOp, value: impl Into<Value>) -> Expr {
        Expr::BinaryOp(ExprBinaryOp {
            column: column.into(),
            op,
            value: value.into(),
        })
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::binary_op(column, BinaryOp::Eq, value)
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::binary_op(column, BinaryOp::Ne, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::binary_op(column, BinaryOp::Lt, value)
    }

    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::binary_op(column, BinaryOp::Le, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::binary_op(column, BinaryOp::Gt, value)
    }

    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Expr {
        Expr::binary_op(column, BinaryOp::Ge, value)
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<Value>) -> Expr {
        Expr::binary_op(column, BinaryOp::Like, pattern)
    }

    /// `column IN (…)`. A scalar value is treated as a one-element list.
    pub fn in_list(column: impl Into<String>, list: impl Into<Value>) -> Expr {
        Expr::InList(ExprInList {
            column: column.into(),
            list: into_list(list.into()),
            negate: false,
        })
    }

    pub fn not_in_list(column: impl Into<String>, list: impl Into<Value>) -> Expr {
        Expr::InList(ExprInList {
            column: column.into(),
            list: into_list(list.into()),
            negate: true,
        })
    }

    pub fn in_subquery(column: impl Into<String>, query: Query) -> Expr {
        Expr::InSubquery(ExprInSubquery {
            column: column.into(),
            query: Box::new(query),
            negate: false,
        })
    }

    pub fn not_in_subquery(column: impl Into<String>, query: Query) -> Expr {
        Expr::InSubquery(ExprInSubquery {
            column: column.into(),
            query: Box::new(query),
            negate: true,
        })
    }

    pub fn between(
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Expr {
        Expr::Between(ExprBetween {
            column: column.into(),
            low: low.into(),
            high: high.into(),
        })
    }

    pub fn is_null(column: impl Into<String>) -> Expr {
        Expr::IsNull(ExprIsNull {
            column: column.into(),
            negate: false,
        })
    }

    pub fn is_not_null(column: impl Into<String>) -> Expr {
        Expr::IsNull(ExprIsNull {
            column: column.into(),
            negate: true,
        })
    }

    pub fn and(self, other: Expr) -> Expr {
        match self {
            Expr::And(mut operands) => {
                operands.push(other);
                Expr::And(operands)
            }
            lhs => Expr::And(vec![lhs, other]),
        }
    }

    pub fn or(self, other: Expr) -> Expr {
        match self {
            Expr::Or(mut operands) => {
                operands.push(other);
                Expr::Or(operands)
            }
            lhs => Expr::Or(vec![lhs, other]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    /// Builds the conjunction of `column = value` terms from a filter map.
    ///
    /// Keys are sorted so the generated SQL is stable, keys starting with
    /// `__` are host-internal and skipped, and `null` values become
    /// `IS NULL`.
    pub fn from_filter(filter: &IndexMap<String, Value>) -> Expr {
        let mut keys: Vec<&String> = filter.keys().filter(|key| !key.starts_with("__")).collect();
        keys.sort();

        Expr::And(
            keys.into_iter()
                .map(|key| match &filter[key] {
                    Value::Null => Expr::is_null(key.clone()),
                    value => Expr::eq(key.clone(), value.clone()),
                })
                .collect(),
        )
    }

    /// Returns `true` if the expression constrains nothing: an empty `And`,
    /// or an `And` made only of empty `And`s.
    pub fn is_empty(&self) -> bool {
        match self {
            Expr::And(operands) => operands.iter().all(Expr::is_empty),
            _ => false,
        }
    }
}

fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::List(items) => items,
        value => vec![value],
    }
}

use super::{Comma, Delimited, Formatter, Ident, Params, ToSql};

use sprig_core::{
    stmt::{self, Aggregate, AggregateFunc, BinaryOp, Value},
    Error, Result,
};

/// A condition tree in the scope of a query. Inside `HAVING`, a column name
/// equal to an aggregate alias refers to that aggregate's expression, since
/// not every database accepts projection aliases there.
pub(super) struct Cond<'a> {
    pub(super) expr: &'a stmt::Expr,
    pub(super) aggregates: &'a [Aggregate],
}

/// A column reference, resolved against the aggregates in scope.
struct Column<'a> {
    name: &'a str,
    aggregates: &'a [Aggregate],
}

impl<'a> Cond<'a> {
    pub(super) fn new(expr: &'a stmt::Expr) -> Cond<'a> {
        Cond {
            expr,
            aggregates: &[],
        }
    }

    fn child(&self, expr: &'a stmt::Expr) -> Cond<'a> {
        Cond {
            expr,
            aggregates: self.aggregates,
        }
    }

    fn column(&self, name: &'a str) -> Column<'a> {
        Column {
            name,
            aggregates: self.aggregates,
        }
    }

    /// An operand of `AND`/`OR`, parenthesized when it is itself a group.
    fn grouped(&self, expr: &'a stmt::Expr) -> (Option<&'static str>, Cond<'a>, Option<&'static str>) {
        let needs_parens = match expr {
            stmt::Expr::And(operands) | stmt::Expr::Or(operands) => operands.len() > 1,
            _ => false,
        };

        if needs_parens {
            (Some("("), self.child(expr), Some(")"))
        } else {
            (None, self.child(expr), None)
        }
    }
}

impl ToSql for Cond<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        use stmt::Expr::*;

        match self.expr {
            And(operands) | Or(operands) if operands.is_empty() => {
                // An empty conjunction holds; an empty disjunction does not.
                let sql = if matches!(self.expr, And(_)) {
                    "1 = 1"
                } else {
                    "1 = 0"
                };
                fmt!(f, sql);
            }
            And(operands) | Or(operands) if operands.len() == 1 => {
                fmt!(f, self.child(&operands[0]));
            }
            And(operands) => {
                let operands = operands.iter().map(|operand| self.grouped(operand));
                fmt!(f, Delimited(operands, " AND "));
            }
            Or(operands) => {
                let operands = operands.iter().map(|operand| self.grouped(operand));
                fmt!(f, Delimited(operands, " OR "));
            }
            Not(expr) => {
                fmt!(f, "NOT (" self.child(expr) ")");
            }
            BinaryOp(expr) => {
                let column = self.column(&expr.column);

                match (&expr.value, expr.op) {
                    (Value::Null, stmt::BinaryOp::Eq) => fmt!(f, column " IS NULL"),
                    (Value::Null, stmt::BinaryOp::Ne) => fmt!(f, column " IS NOT NULL"),
                    (Value::List(_), op) => {
                        return Err(Error::invalid_statement(format!(
                            "operator `{}` on column `{}` does not accept a list",
                            op.as_sql(),
                            expr.column
                        )))
                    }
                    (value, op) => fmt!(f, column " " op " " value),
                }
            }
            InList(expr) => match (expr.list.is_empty(), expr.negate) {
                (true, false) => fmt!(f, "1 = 0"),
                (true, true) => fmt!(f, "1 = 1"),
                (false, negate) => {
                    let op = if negate { " NOT IN (" } else { " IN (" };
                    fmt!(f, self.column(&expr.column) op Comma(&expr.list) ")");
                }
            },
            InSubquery(expr) => {
                let op = if expr.negate { " NOT IN (" } else { " IN (" };
                let query = &*expr.query;
                fmt!(f, self.column(&expr.column) op query ")");
            }
            Between(expr) => {
                let (low, high) = (&expr.low, &expr.high);
                fmt!(f, self.column(&expr.column) " BETWEEN " low " AND " high);
            }
            IsNull(expr) => {
                let op = if expr.negate { " IS NOT NULL" } else { " IS NULL" };
                fmt!(f, self.column(&expr.column) op);
            }
        }

        Ok(())
    }
}

impl ToSql for Column<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        match self
            .aggregates
            .iter()
            .find(|aggregate| aggregate.alias == self.name)
        {
            Some(aggregate) => AggregateExpr(aggregate).to_sql(f),
            None => Ident(self.name).to_sql(f),
        }
    }
}

impl ToSql for BinaryOp {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        f.dst.push_str(self.as_sql());
        Ok(())
    }
}

/// The aggregate call without its alias.
pub(super) struct AggregateExpr<'a>(pub(super) &'a Aggregate);

impl ToSql for AggregateExpr<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let aggregate = self.0;
        let func = aggregate.func.as_sql();

        let Some(column) = &aggregate.column else {
            if aggregate.func != AggregateFunc::Count {
                return Err(Error::invalid_statement(format!(
                    "{func} requires a column"
                )));
            }

            fmt!(f, "COUNT(*)");
            return Ok(());
        };

        // PostgreSQL returns NUMERIC for SUM and AVG over integers, which has
        // no lossless mapping to a driver value; read it back as a double.
        let cast = f.serializer.is_postgresql()
            && matches!(aggregate.func, AggregateFunc::Sum | AggregateFunc::Avg);

        if cast {
            fmt!(f, "CAST(" func "(" Ident(column) ") AS DOUBLE PRECISION)");
        } else {
            fmt!(f, func "(" Ident(column) ")");
        }

        Ok(())
    }
}

/// `<aggregate> AS <alias>` in a projection.
impl ToSql for &Aggregate {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        fmt!(f, AggregateExpr(self) " AS " Ident(&self.alias));
        Ok(())
    }
}

use super::{Comma, Formatter, Params, ToSql};

use sprig_core::{stmt, Error, Result};

impl ToSql for &stmt::Value {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        match self {
            stmt::Value::List(values) => {
                fmt!(f, "(" Comma(values) ")");
            }
            value => {
                let placeholder = f.params.push(value);
                fmt!(f, placeholder);
            }
        }
        Ok(())
    }
}

/// A value rendered inline as a SQL literal. Only used for DDL, where
/// statements cannot carry parameters.
pub(super) struct Literal<'a>(pub(super) &'a stmt::Value);

impl ToSql for Literal<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        use stmt::Value::*;

        match self.0 {
            Null => f.dst.push_str("NULL"),
            Bool(value) if f.serializer.is_sqlite() => {
                f.dst.push_str(if *value { "1" } else { "0" })
            }
            Bool(value) => f.dst.push_str(if *value { "TRUE" } else { "FALSE" }),
            I64(value) => f.dst.push_str(&value.to_string()),
            F64(value) if value.is_finite() => f.dst.push_str(&value.to_string()),
            Json(value) => quoted(f.dst, &value.to_string()),
            List(_) | F64(_) => {
                return Err(Error::invalid_statement(format!(
                    "{} cannot be rendered as a SQL literal",
                    self.0.type_name()
                )))
            }
            value => quoted(f.dst, &value.to_string()),
        }
        Ok(())
    }
}

/// Single-quoted string literal with embedded quotes doubled.
fn quoted(dst: &mut String, s: &str) {
    dst.push('\'');
    dst.push_str(&s.replace('\'', "''"));
    dst.push('\'');
}

use super::value::Literal;
use super::{Comma, Delimited, Formatter, Ident, Params, ToSql};

use sprig_core::{
    schema::{Field, Range, Schema},
    Result,
};

/// `CREATE TABLE IF NOT EXISTS` for a schema bound to a table name.
pub(super) struct CreateTable<'a> {
    pub(super) schema: &'a Schema,
    pub(super) table: &'a str,
}

struct ColumnDef<'a>(&'a Field);

/// Inline `CHECK` constraints for one column. Pattern and format rules stay
/// in the application.
struct Checks<'a>(&'a Field);

impl ToSql for CreateTable<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        fmt!(f, "CREATE TABLE IF NOT EXISTS " Ident(self.table) " (");

        for (index, field) in self.schema.fields().enumerate() {
            if index > 0 {
                fmt!(f, ",");
            }
            fmt!(f, "\n    " ColumnDef(field));
        }

        fmt!(f, "\n)");
        Ok(())
    }
}

impl ToSql for ColumnDef<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let field = self.0;
        let flavor = f.serializer.flavor;

        fmt!(f, Ident(&field.name) " ");

        if field.primary_key {
            match flavor.auto_increment_clause(field.ty).filter(|_| field.auto) {
                Some(clause) => fmt!(f, clause),
                None => fmt!(f, &flavor.column_type(field) " PRIMARY KEY"),
            }
            return Ok(());
        }

        fmt!(f, &flavor.column_type(field));

        if field.is_required() {
            fmt!(f, " NOT NULL");
        }

        if field.is_unique() {
            fmt!(f, " UNIQUE");
        }

        if let Some(default) = &field.default {
            fmt!(f, " DEFAULT " Literal(default));
        }

        fmt!(f, Checks(field));
        Ok(())
    }
}

impl ToSql for Checks<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let field = self.0;
        let constraints = &field.constraints;
        let column = || Ident(&field.name);

        if !constraints.enum_values.is_empty() {
            let values: Vec<_> = constraints
                .enum_values
                .iter()
                .map(|value| sprig_core::stmt::Value::from(value.as_str()))
                .collect();

            fmt!(f, " CHECK (" column() " IN (" Comma(values.iter().map(Literal)) "))");
        }

        let length = f.serializer.flavor.length_fn();
        let bounds = match &constraints.range {
            Some(Range::Int { min, max }) => {
                bound_list(min.map(|v| v.to_string()), max.map(|v| v.to_string()))
            }
            Some(Range::Float { min, max }) => {
                bound_list(min.map(|v| v.to_string()), max.map(|v| v.to_string()))
            }
            None => vec![],
        };

        if !bounds.is_empty() {
            let terms = bounds
                .iter()
                .map(|(op, bound)| (column(), *op, bound.as_str()));
            fmt!(f, " CHECK (" Delimited(terms, " AND ") ")");
        }

        let lengths = bound_list(
            constraints.min_length.map(|v| v.to_string()),
            constraints.max_length.map(|v| v.to_string()),
        );

        if !lengths.is_empty() {
            let terms = lengths
                .iter()
                .map(|(op, bound)| (length, "(", column(), (")", *op, bound.as_str())));
            fmt!(f, " CHECK (" Delimited(terms, " AND ") ")");
        }

        Ok(())
    }
}

fn bound_list(min: Option<String>, max: Option<String>) -> Vec<(&'static str, String)> {
    min.map(|min| (" >= ", min))
        .into_iter()
        .chain(max.map(|max| (" <= ", max)))
        .collect()
}

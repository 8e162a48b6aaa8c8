use super::expr::Cond;
use super::{Comma, Flavor, Formatter, Ident, Params, ToSql};

use sprig_core::{
    stmt::{self, Select, Terminal},
    Error, Result,
};

impl ToSql for &stmt::Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        use stmt::Statement::*;

        match self {
            Query(stmt) => stmt.to_sql(f),
            Insert(stmt) => stmt.to_sql(f),
            Update(stmt) => stmt.to_sql(f),
            Delete(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::Query {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        match self.terminal {
            Terminal::Many | Terminal::Execute => fmt!(f, SelectStmt(self, self.limit)),
            // A single row never needs more than one.
            Terminal::One => fmt!(f, SelectStmt(self, Some(self.limit.map_or(1, |n| n.min(1))))),
            Terminal::Count if self.needs_subquery() => {
                fmt!(f, "SELECT COUNT(*) FROM (" SelectStmt(self, self.limit) ") AS " Ident("counted"));
            }
            Terminal::Count => {
                fmt!(f, "SELECT COUNT(*) FROM " Ident(&self.table) Where(self.filter.as_ref()));
            }
            Terminal::Exists if self.needs_subquery() => {
                fmt!(f, "SELECT 1 FROM (" SelectStmt(self, self.limit) ") AS " Ident("matched") " LIMIT 1");
            }
            Terminal::Exists => {
                fmt!(f, "SELECT 1 FROM " Ident(&self.table) Where(self.filter.as_ref()) " LIMIT 1");
            }
        }

        Ok(())
    }
}

trait QueryExt {
    /// Counting or probing this query must go through a derived table,
    /// because grouping or paging changes which rows exist.
    fn needs_subquery(&self) -> bool;
}

impl QueryExt for stmt::Query {
    fn needs_subquery(&self) -> bool {
        self.is_grouped() || self.limit.is_some() || self.offset.is_some()
    }
}

/// A full `SELECT` with an overridden limit.
struct SelectStmt<'a>(&'a stmt::Query, Option<u64>);

impl ToSql for SelectStmt<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let SelectStmt(query, limit) = self;

        if query.having.is_some() && !query.is_grouped() {
            return Err(Error::invalid_statement(format!(
                "HAVING on `{}` requires GROUP BY or an aggregate",
                query.table
            )));
        }

        fmt!(f, "SELECT " Projection(query) " FROM " Ident(&query.table) Where(query.filter.as_ref()));

        if !query.group_by.is_empty() {
            let columns = Comma(query.group_by.iter().map(Ident));
            fmt!(f, " GROUP BY " columns);
        }

        if let Some(having) = &query.having {
            let having = Cond {
                expr: having,
                aggregates: &query.aggregates,
            };
            fmt!(f, " HAVING " having);
        }

        if !query.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(&query.order_by));
        }

        fmt!(f, Paging { limit, offset: query.offset });

        Ok(())
    }
}

struct Projection<'a>(&'a stmt::Query);

impl ToSql for Projection<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let query = self.0;

        let columns: &[String] = match &query.select {
            Select::Columns(columns) => columns,
            // Aggregating `*` only makes sense for the grouping columns.
            Select::All if query.is_grouped() => &query.group_by,
            Select::All => {
                fmt!(f, "*");
                return Ok(());
            }
        };

        match (columns.is_empty(), query.aggregates.is_empty()) {
            (true, true) => {
                return Err(Error::invalid_statement(format!(
                    "query on `{}` selects no columns",
                    query.table
                )))
            }
            (false, true) => fmt!(f, Comma(columns.iter().map(Ident))),
            (true, false) => fmt!(f, Comma(&query.aggregates)),
            (false, false) => {
                fmt!(f, Comma(columns.iter().map(Ident)) ", " Comma(&query.aggregates));
            }
        }

        Ok(())
    }
}

impl ToSql for &stmt::OrderBy {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        fmt!(f, Ident(&self.column) " " self.direction.as_sql());
        Ok(())
    }
}

struct Paging {
    limit: Option<u64>,
    offset: Option<u64>,
}

impl ToSql for Paging {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        match (self.limit, self.offset) {
            (None, None) => {}
            (Some(limit), None) => fmt!(f, " LIMIT " limit),
            (Some(limit), Some(offset)) => fmt!(f, " LIMIT " limit " OFFSET " offset),
            // OFFSET without LIMIT is only valid on PostgreSQL; the others
            // take the largest representable limit.
            (None, Some(offset)) => match f.serializer.flavor {
                Flavor::Postgresql => fmt!(f, " OFFSET " offset),
                Flavor::Sqlite => fmt!(f, " LIMIT -1 OFFSET " offset),
                Flavor::Mysql => fmt!(f, " LIMIT 18446744073709551615 OFFSET " offset),
            },
        }
        Ok(())
    }
}

/// ` WHERE <cond>`, or nothing for a missing or empty filter.
struct Where<'a>(Option<&'a stmt::Expr>);

impl ToSql for Where<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        if let Some(expr) = self.0.filter(|expr| !expr.is_empty()) {
            fmt!(f, " WHERE " Cond::new(expr));
        }
        Ok(())
    }
}

/// The `WHERE` clause of a mutation. An empty condition is refused:
/// touching every row must be requested as [`stmt::Filter::All`].
struct MutationFilter<'a> {
    verb: &'static str,
    table: &'a str,
    filter: &'a stmt::Filter,
}

impl ToSql for MutationFilter<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        match self.filter {
            stmt::Filter::All => Ok(()),
            stmt::Filter::Expr(expr) if expr.is_empty() => Err(Error::invalid_statement(format!(
                "refusing to {} every row of `{}` without a filter",
                self.verb, self.table
            ))),
            stmt::Filter::Expr(expr) => {
                fmt!(f, " WHERE " Cond::new(expr));
                Ok(())
            }
        }
    }
}

struct Returning(bool);

impl ToSql for Returning {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        if !self.0 {
            return Ok(());
        }

        if f.serializer.is_mysql() {
            return Err(Error::unsupported_feature(
                "MySQL does not support the RETURNING clause",
            ));
        }

        fmt!(f, " RETURNING *");
        Ok(())
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let Some(first) = self.rows.first() else {
            return Err(Error::invalid_statement(format!(
                "insert into `{}` has no rows",
                self.table
            )));
        };

        for row in &self.rows[1..] {
            if !row.keys().eq(first.keys()) {
                return Err(Error::invalid_statement(format!(
                    "rows inserted into `{}` assign different columns",
                    self.table
                )));
            }
        }

        let table = Ident(&self.table);

        if first.is_empty() {
            if self.rows.len() > 1 || self.on_conflict.is_some() {
                return Err(Error::invalid_statement(format!(
                    "insert into `{}` assigns no columns",
                    self.table
                )));
            }

            match f.serializer.flavor {
                Flavor::Mysql => fmt!(f, "INSERT INTO " table " () VALUES ()"),
                Flavor::Sqlite | Flavor::Postgresql => {
                    fmt!(f, "INSERT INTO " table " DEFAULT VALUES")
                }
            }
        } else {
            let columns = Comma(first.keys().map(Ident));
            let rows = Comma(self.rows.iter().map(|row| ("(", Comma(row.values()), ")")));

            fmt!(f, "INSERT INTO " table " (" columns ") VALUES " rows);
        }

        if let Some(on_conflict) = &self.on_conflict {
            fmt!(f, Upsert { insert: self, on_conflict });
        }

        fmt!(f, Returning(self.returning));
        Ok(())
    }
}

struct Upsert<'a> {
    insert: &'a stmt::Insert,
    on_conflict: &'a stmt::OnConflict,
}

impl ToSql for Upsert<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let conflict = &self.on_conflict.columns;

        if conflict.is_empty() {
            return Err(Error::invalid_statement(format!(
                "upsert into `{}` names no conflict columns",
                self.insert.table
            )));
        }

        let updated: Vec<&str> = self
            .insert
            .columns()
            .filter(|column| !conflict.iter().any(|c| c.as_str() == *column))
            .filter(|column| !self.on_conflict.keep.iter().any(|c| c.as_str() == *column))
            .collect();

        if f.serializer.is_mysql() {
            // MySQL has no DO NOTHING; assigning a key column to itself is
            // the conventional no-op.
            let assignments: Vec<(Ident<&str>, &str, Ident<&str>, &str)> = if updated.is_empty() {
                vec![(Ident(conflict[0].as_str()), " = ", Ident(conflict[0].as_str()), "")]
            } else {
                updated
                    .iter()
                    .map(|column| (Ident(*column), " = VALUES(", Ident(*column), ")"))
                    .collect()
            };

            fmt!(f, " ON DUPLICATE KEY UPDATE " Comma(assignments));
        } else if updated.is_empty() {
            fmt!(f, " ON CONFLICT (" Comma(conflict.iter().map(Ident)) ") DO NOTHING");
        } else {
            let assignments = updated
                .iter()
                .map(|column| (Ident(*column), " = EXCLUDED.", Ident(*column)));

            fmt!(f, " ON CONFLICT (" Comma(conflict.iter().map(Ident)) ") DO UPDATE SET " Comma(assignments));
        }

        Ok(())
    }
}

impl ToSql for &stmt::Update {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        if self.assignments.is_empty() {
            return Err(Error::invalid_statement(format!(
                "update of `{}` assigns no columns",
                self.table
            )));
        }

        let assignments = self
            .assignments
            .iter()
            .map(|(column, value)| (Ident(column), " = ", value));

        let filter = MutationFilter {
            verb: "update",
            table: &self.table,
            filter: &self.filter,
        };

        fmt!(f, "UPDATE " Ident(&self.table) " SET " Comma(assignments) filter Returning(self.returning));
        Ok(())
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let filter = MutationFilter {
            verb: "delete",
            table: &self.table,
            filter: &self.filter,
        };

        fmt!(f, "DELETE FROM " Ident(&self.table) filter);
        Ok(())
    }
}

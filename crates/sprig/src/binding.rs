//! Schemas bound to tables.
//!
//! A [`TableBinding`] is built once per schema, table and database handle
//! through [`Db::binding`](crate::Db::binding). It is immutable afterwards;
//! every operation compiles a fresh statement from its arguments.

mod aggregate;

mod config;
pub use config::{BindingConfig, Builder};

mod exec;
pub use exec::Output;

mod options;
pub use options::{Limit, QueryOptions};

mod outcome;
pub use outcome::Outcome;

mod read;
mod write;

use crate::{Db, Record, Result, Schema, Table};

use sprig_core::driver::{Operation, Response, Sql, ValueSet};
use sprig_core::ident::Ident;
use sprig_core::stmt::{Assignments, Expr, Query, Statement, Value};
use sprig_sql::Flavor;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TableBinding {
    db: Db,
    schema: Arc<Schema>,
    table: Ident,
    config: BindingConfig,

    /// Whether writes read rows back with `RETURNING`.
    returning: bool,
}

impl TableBinding {
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn table(&self) -> &str {
        self.table.as_str()
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn flavor(&self) -> Flavor {
        self.db.flavor()
    }

    /// Whether writes read rows back with `RETURNING` rather than a follow-up
    /// `SELECT`.
    pub fn uses_returning(&self) -> bool {
        self.returning
    }

    /// Emits `CREATE TABLE IF NOT EXISTS` for the bound schema.
    pub fn create_table(&self) -> Result<()> {
        let sql = self
            .db
            .serializer()
            .serialize_create_table(&self.schema, self.table())?;

        tracing::debug!(table = %self.table, sql = %sql, "creating table");

        self.db.exec(Operation::Execute(Sql::new(sql, vec![])))?;
        Ok(())
    }

    /// A query over live rows: soft-deleted rows are filtered out.
    fn query(&self) -> Query {
        let query = Query::new(self.table());
        match &self.config.soft_delete {
            Some(column) => query.filter(Expr::is_null(column.clone())),
            None => query,
        }
    }

    /// Live rows matching every `column = value` pair of `filter`.
    fn matching(&self, filter: &Assignments) -> Query {
        let expr = Expr::from_filter(filter);
        if expr.is_empty() {
            self.query()
        } else {
            self.query().filter(expr)
        }
    }

    /// The primary-key column, or `id` for schemas without one.
    fn key_column(&self) -> &str {
        self.schema
            .identity()
            .map(|identity| identity.field.as_str())
            .unwrap_or("id")
    }

    /// Serializes `stmt` and sends it to the database.
    fn dispatch(&self, stmt: &Statement, returns_rows: bool) -> Result<Response> {
        let mut params = vec![];
        let sql = self.db.serializer().serialize(stmt, &mut params)?;

        tracing::debug!(
            table = %self.table,
            sql = %sql,
            params = params.len(),
            "dispatching statement"
        );

        let sql = Sql::new(sql, params);
        let op = if returns_rows {
            Operation::Query(sql)
        } else {
            Operation::Execute(sql)
        };

        self.db.exec(op)
    }

    fn fetch_rows(&self, stmt: impl Into<Statement>) -> Result<ValueSet> {
        let values = self.dispatch(&stmt.into(), true)?.rows.into_values()?;
        tracing::trace!(table = %self.table, rows = values.len(), "rows returned");
        Ok(values)
    }

    fn fetch(&self, stmt: impl Into<Statement>) -> Result<Table> {
        let values = self.fetch_rows(stmt)?;
        Ok(self.table_from(values))
    }

    fn fetch_one(&self, stmt: impl Into<Statement>) -> Result<Option<Record>> {
        Ok(self.fetch(stmt)?.into_rows().into_iter().next())
    }

    fn fetch_scalar(&self, stmt: impl Into<Statement>) -> Result<Value> {
        Ok(self.fetch_rows(stmt)?.scalar())
    }

    fn execute(&self, stmt: impl Into<Statement>) -> Result<Response> {
        self.dispatch(&stmt.into(), false)
    }

    fn table_from(&self, values: ValueSet) -> Table {
        let ValueSet { columns, rows } = values;
        let rows = rows
            .into_iter()
            .map(|row| Record::from_row(self.schema.clone(), &columns, row))
            .collect();
        Table::new(self.schema.clone(), rows)
    }
}

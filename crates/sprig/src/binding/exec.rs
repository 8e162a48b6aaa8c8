use super::aggregate::count_from;
use super::{Outcome, TableBinding};
use crate::{Error, Record, Result, Table};

use sprig_core::schema::{FieldDef, FieldType, Schema};
use sprig_core::stmt::{
    AggregateFunc, Delete, Expr, Filter, Insert, Query, Select, Statement, Terminal, Update, Value,
};
use std::sync::Arc;

/// Result of executing a statement, shaped by its [`Terminal`].
#[derive(Debug, Clone)]
pub enum Output {
    /// Rows of a `Many` terminal.
    Table(Table),

    /// The row of a `One` terminal, if any matched.
    Record(Option<Record>),

    /// Matching rows of a query, or affected rows of a mutation.
    Count(u64),

    Exists(bool),

    /// `Execute` terminal; nothing is returned.
    Unit,

    /// The write was refused by validation and never reached the database.
    Rejected(Vec<Record>),
}

impl Output {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Output::Rejected(_))
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Output::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Output::Record(record) => record,
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            Output::Count(count) => Some(*count),
            _ => None,
        }
    }

    pub fn as_exists(&self) -> Option<bool> {
        match self {
            Output::Exists(exists) => Some(*exists),
            _ => None,
        }
    }

    fn rows(table: Table, terminal: Terminal) -> Output {
        match terminal {
            Terminal::Many => Output::Table(table),
            Terminal::One => Output::Record(table.into_rows().into_iter().next()),
            Terminal::Count => Output::Count(table.len() as u64),
            Terminal::Exists => Output::Exists(!table.is_empty()),
            Terminal::Execute => Output::Unit,
        }
    }
}

impl TableBinding {
    /// Executes a statement built by the evaluator against the bound table.
    ///
    /// Reads see only live rows. Writes follow the same rules as the typed
    /// methods: input is validated before any SQL is built, filtered
    /// mutations with an empty filter are refused, and unique violations
    /// come back as `UNIQUE` field errors.
    pub fn exec(&self, stmt: impl Into<Statement>) -> Result<Output> {
        let stmt = stmt.into();

        if stmt.table() != self.table() {
            return Err(Error::invalid_statement(format!(
                "statement targets `{}` but the binding is for `{}`",
                stmt.table(),
                self.table
            )));
        }

        match stmt {
            Statement::Query(query) => self.exec_query(query),
            Statement::Insert(insert) => self.exec_insert(insert),
            Statement::Update(update) => self.exec_update(update),
            Statement::Delete(delete) => self.exec_delete(delete),
        }
    }

    fn exec_query(&self, query: Query) -> Result<Output> {
        let query = match &self.config.soft_delete {
            Some(column) => query.filter(Expr::is_null(column.clone())),
            None => query,
        };

        match query.terminal {
            Terminal::Count => Ok(Output::Count(count_from(self.fetch_scalar(query)?)?)),
            Terminal::Exists => Ok(Output::Exists(!self.fetch_rows(query)?.is_empty())),
            Terminal::Execute => {
                self.fetch_rows(query)?;
                Ok(Output::Unit)
            }
            terminal if query.is_grouped() => {
                let schema = self.grouped_schema(&query)?;
                let values = self.fetch_rows(query)?;
                let rows = values
                    .rows
                    .into_iter()
                    .map(|row| Record::from_row(schema.clone(), &values.columns, row))
                    .collect();
                Ok(Output::rows(Table::new(schema, rows), terminal))
            }
            terminal => Ok(Output::rows(self.fetch(query)?, terminal)),
        }
    }

    /// Schema describing the rows of a grouped query, so aggregate aliases
    /// survive decoding.
    fn grouped_schema(&self, query: &Query) -> Result<Arc<Schema>> {
        let ty_of = |column: &str| match self.schema.field(column).map(|field| field.ty) {
            Some(FieldType::Enum) | None => FieldType::String,
            Some(ty) => ty,
        };

        let grouped: Vec<&String> = match &query.select {
            Select::All => query.group_by.iter().collect(),
            Select::Columns(columns) => columns.iter().collect(),
        };

        let mut defs: Vec<FieldDef> = grouped
            .into_iter()
            .map(|column| FieldDef::new(column.clone(), ty_of(column).name()).optional())
            .collect();

        for aggregate in &query.aggregates {
            let ty = match (aggregate.func, &aggregate.column) {
                (AggregateFunc::Count, _) => FieldType::BigInt,
                (AggregateFunc::Avg, _) => FieldType::Float,
                // A money aggregate is a count of minor units; decoding
                // it as money would rescale driver-widened results.
                (_, Some(column)) => match ty_of(column) {
                    FieldType::Money | FieldType::Int => FieldType::BigInt,
                    ty => ty,
                },
                (_, None) => FieldType::Float,
            };
            defs.push(FieldDef::new(aggregate.alias.clone(), ty.name()).optional());
        }

        let schema = Schema::builder(self.schema.name())
            .fields(defs)
            .build()
            .map_err(|err| err.context("grouped query"))?;

        Ok(Arc::new(schema))
    }

    fn exec_insert(&self, insert: Insert) -> Result<Output> {
        let terminal = insert.terminal;

        if let Some(on_conflict) = &insert.on_conflict {
            let [row] = &insert.rows[..] else {
                return Err(Error::invalid_statement("an upsert writes exactly one row"));
            };

            let conflict: Vec<&str> = on_conflict.columns.iter().map(String::as_str).collect();
            let record = self.upsert(row.clone(), &conflict)?;
            return Ok(self.written(record, terminal));
        }

        if let [row] = &insert.rows[..] {
            let record = self.insert_record(&Record::new(self.schema.clone(), row.clone()))?;
            return Ok(self.written(record, terminal));
        }

        let records = insert
            .rows
            .into_iter()
            .map(|row| self.prepare(&Record::new(self.schema.clone(), row)))
            .collect();

        Ok(match self.insert_prepared(records)? {
            Outcome::Done(table) => Output::rows(table, terminal),
            Outcome::Rejected(records) => Output::Rejected(records),
        })
    }

    fn written(&self, record: Record, terminal: Terminal) -> Output {
        if record.is_valid() {
            Output::rows(Table::new(self.schema.clone(), vec![record]), terminal)
        } else {
            Output::Rejected(vec![record])
        }
    }

    fn exec_update(&self, update: Update) -> Result<Output> {
        let filter = self.checked_filter("update", update.filter)?;

        let assignments = match self.update_assignments(update.assignments)? {
            Outcome::Done(assignments) => assignments,
            Outcome::Rejected(records) => return Ok(Output::Rejected(records)),
        };

        let terminal = update.terminal;
        let mut stmt = Update::new(self.table(), filter.clone(), assignments.clone());

        let written = self.db.savepoint(|_| match terminal {
            Terminal::Many | Terminal::One | Terminal::Exists if self.returning => {
                stmt.returning = true;
                stmt.terminal = Terminal::Many;
                self.fetch(stmt).map(|table| Output::rows(table, terminal))
            }
            Terminal::Many | Terminal::One | Terminal::Exists => self
                .db
                .transaction(|_| {
                    let keys = self.matching_keys(&filter)?;
                    self.execute(stmt)?;
                    self.fetch_keys(keys)
                })
                .map(|table| Output::rows(table, terminal)),
            Terminal::Count | Terminal::Execute => self
                .execute(stmt)
                .and_then(|response| response.rows.into_count())
                .map(|count| match terminal {
                    Terminal::Count => Output::Count(count),
                    _ => Output::Unit,
                }),
        });

        match written {
            Ok(output) => Ok(output),
            Err(err) => {
                let record = self.reject_unique(err, Record::new(self.schema.clone(), assignments))?;
                Ok(Output::Rejected(vec![record]))
            }
        }
    }

    fn exec_delete(&self, delete: Delete) -> Result<Output> {
        let filter = self.checked_filter("delete", delete.filter)?;

        match delete.terminal {
            Terminal::Count => Ok(Output::Count(self.delete_where(filter)?)),
            Terminal::Execute => {
                self.delete_where(filter)?;
                Ok(Output::Unit)
            }
            terminal => {
                let table = self.db.transaction(|_| {
                    let mut query = Query::new(self.table());
                    if let Filter::Expr(expr) = &filter {
                        query = query.filter(expr.clone());
                    }
                    let table = self.fetch(query)?;
                    self.delete_where(filter)?;
                    Ok(table)
                })?;
                Ok(Output::rows(table, terminal))
            }
        }
    }

    /// Refuses an empty filter and restricts the rest to live rows.
    fn checked_filter(&self, verb: &str, filter: Filter) -> Result<Filter> {
        match filter {
            Filter::All => Ok(self.live_filter()),
            Filter::Expr(expr) if expr.is_empty() => Err(self.unfiltered(verb)),
            Filter::Expr(expr) => Ok(Filter::Expr(self.live(expr))),
        }
    }

    fn matching_keys(&self, filter: &Filter) -> Result<Vec<Value>> {
        let Some(identity) = self.schema.identity() else {
            return Err(Error::unsupported_feature(format!(
                "returning updated rows of `{}` needs RETURNING or a primary key",
                self.table
            )));
        };

        let mut query = Query::new(self.table()).select([identity.field.as_str()]);
        if let Filter::Expr(expr) = filter {
            query = query.filter(expr.clone());
        }

        let values = self.fetch_rows(query)?;
        Ok(values.rows.into_iter().filter_map(|row| row.into_iter().next()).collect())
    }

    fn fetch_keys(&self, keys: Vec<Value>) -> Result<Table> {
        if keys.is_empty() {
            return Ok(Table::new(self.schema.clone(), vec![]));
        }

        let query = Query::new(self.table()).filter(Expr::in_list(self.key_column(), keys));
        self.fetch(query)
    }
}

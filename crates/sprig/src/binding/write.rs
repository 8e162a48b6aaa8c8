use super::{Outcome, TableBinding};
use crate::{Db, Error, Record, Result, Table};

use chrono::Utc;
use indexmap::IndexMap;
use sprig_core::driver::{Response, Rows};
use sprig_core::schema::FieldType;
use sprig_core::stmt::{Assignments, Delete, Expr, Filter, Insert, Query, Terminal, Update, Value};
use sprig_core::validate::{self, ErrorCode, FieldError};
use std::slice;

impl TableBinding {
    /// Validates `data` and inserts it as one row.
    ///
    /// Fields the input omits get their declared default; a missing
    /// client-generated key (`uuid`, `ulid`) is generated and missing `auto`
    /// timestamps are set to now. The returned record is the row as stored,
    /// or the input carrying its field errors when validation failed or a
    /// unique constraint was hit. Nothing is sent to the database for
    /// invalid input.
    pub fn insert<I, K, V>(&self, data: I) -> Result<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert_record(&Record::new(self.schema.clone(), data))
    }

    /// Like [`TableBinding::insert`], keeping any `CUSTOM` errors the caller
    /// already merged into `record`.
    pub fn insert_record(&self, record: &Record) -> Result<Record> {
        let record = self.prepare(record);
        if !record.is_valid() {
            return Ok(record);
        }

        let written = self.insert_stmt(slice::from_ref(&record)).and_then(|insert| {
            self.db
                .savepoint(|_| self.write_rows(insert, slice::from_ref(&record)))
        });

        match written {
            Ok(table) => Ok(table.into_rows().into_iter().next().unwrap_or(record)),
            Err(err) => self.reject_unique(err, record),
        }
    }

    /// Validates every row, then inserts them with one statement inside a
    /// transaction. If any row is invalid nothing is sent and the invalid
    /// records are returned.
    pub fn insert_many(&self, rows: impl IntoIterator<Item = Assignments>) -> Result<Outcome<Table>> {
        let records = rows
            .into_iter()
            .map(|row| self.prepare(&Record::new(self.schema.clone(), row)))
            .collect();

        self.insert_prepared(records)
    }

    /// Inserts `data`, or overwrites the row it collides with on
    /// `conflict`. The primary key and `auto` fields of an existing row are
    /// kept.
    pub fn upsert<I, K, V>(&self, data: I, conflict: &[&str]) -> Result<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let record = self.prepare(&Record::new(self.schema.clone(), data));
        if !record.is_valid() {
            return Ok(record);
        }

        let mut lookup = Query::new(self.table()).terminal(Terminal::One);
        for column in conflict {
            if !self.schema.contains(column) {
                return Err(Error::invalid_statement(format!(
                    "conflict column `{column}` is not a field of `{}`",
                    self.schema.name()
                )));
            }

            match record.get(column) {
                Some(value) if !value.is_null() => {
                    lookup = lookup.filter(Expr::eq(*column, value.clone()));
                }
                _ => {
                    return Err(Error::invalid_statement(format!(
                        "upsert needs a value for conflict column `{column}`"
                    )))
                }
            }
        }

        let keep: Vec<&str> = self
            .schema
            .fields()
            .filter(|field| field.primary_key || field.auto)
            .map(|field| field.name.as_str())
            .filter(|name| !conflict.contains(name))
            .collect();

        let insert = self
            .insert_stmt(slice::from_ref(&record))?
            .on_conflict(conflict.iter().copied())
            .keep_on_conflict(keep);

        let written = self.db.savepoint(|_| {
            let returned = if self.returning {
                self.fetch_one(returning(insert))?
            } else {
                self.execute(insert)?;
                None
            };

            // `DO NOTHING` returns no row, so look the row up either way.
            match returned {
                Some(row) => Ok(Some(row)),
                None => self.fetch_one(lookup),
            }
        });

        match written {
            Ok(row) => Ok(row.unwrap_or(record)),
            Err(err) => self.reject_unique(err, record),
        }
    }

    /// Updates live rows matching every `column = value` pair of `filter`
    /// and returns how many changed.
    ///
    /// Only the supplied fields are validated. Unknown and read-only fields
    /// are dropped and changing the primary key is refused. An empty filter
    /// is refused; use [`TableBinding::update_all`] to touch every row.
    pub fn update<I, K, V>(&self, filter: &Assignments, data: I) -> Result<Outcome<u64>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let filter = Filter::Expr(self.live(self.mutation_filter("update", filter)?));
        self.update_where(filter, data)
    }

    /// Updates every live row.
    pub fn update_all<I, K, V>(&self, data: I) -> Result<Outcome<u64>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.update_where(self.live_filter(), data)
    }

    /// Deletes rows matching `filter`, or stamps the soft-delete column when
    /// one is configured. Returns the number of rows affected. An empty
    /// filter is refused; use [`TableBinding::delete_all`].
    pub fn delete(&self, filter: &Assignments) -> Result<u64> {
        let expr = self.mutation_filter("delete", filter)?;
        self.delete_where(Filter::Expr(self.live(expr)))
    }

    /// Deletes (or soft-deletes) every live row.
    pub fn delete_all(&self) -> Result<u64> {
        self.delete_where(self.live_filter())
    }

    fn update_where<I, K, V>(&self, filter: Filter, data: I) -> Result<Outcome<u64>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let assignments = match self.update_assignments(data)? {
            Outcome::Done(assignments) => assignments,
            Outcome::Rejected(records) => return Ok(Outcome::Rejected(records)),
        };

        let update = Update::new(self.table(), filter, assignments.clone());

        let updated = self
            .db
            .savepoint(|_| self.execute(update)?.rows.into_count());

        match updated {
            Ok(count) => Ok(Outcome::Done(count)),
            Err(err) => {
                let record = Record::new(self.schema.clone(), assignments);
                Ok(Outcome::Rejected(vec![self.reject_unique(err, record)?]))
            }
        }
    }

    pub(super) fn delete_where(&self, filter: Filter) -> Result<u64> {
        let response = match &self.config.soft_delete {
            Some(column) => {
                let mut stamp = IndexMap::new();
                stamp.insert(column.clone(), self.now(column));
                self.execute(Update::new(self.table(), filter, stamp))?
            }
            None => self.execute(Delete::new(self.table(), filter))?,
        };

        response.rows.into_count()
    }

    /// Applies defaults and generated values, then validates.
    pub(super) fn prepare(&self, record: &Record) -> Record {
        let mut data = record.data().clone();
        let identity = self.schema.identity();

        for field in self.schema.fields() {
            if data.get(&field.name).is_some_and(|value| !value.is_null()) {
                continue;
            }

            let value = if let Some(default) = &field.default {
                Some(default.clone())
            } else if field.primary_key && field.auto {
                identity.and_then(|identity| identity.strategy.generate())
            } else if field.auto {
                now_for(field.ty)
            } else {
                None
            };

            if let Some(value) = value {
                data.insert(field.name.clone(), value);
            }
        }

        let mut prepared = Record::new(self.schema.clone(), data);
        for error in record.errors().values() {
            if error.code == ErrorCode::Custom {
                prepared = prepared.with_error_code(&error.field, error.code, error.message.clone());
            }
        }

        prepared.validate()
    }

    pub(super) fn insert_prepared(&self, records: Vec<Record>) -> Result<Outcome<Table>> {
        let rejected: Vec<Record> = records
            .iter()
            .filter(|record| !record.is_valid())
            .cloned()
            .collect();

        if !rejected.is_empty() {
            tracing::debug!(
                table = %self.table,
                rejected = rejected.len(),
                "batch insert failed validation"
            );
            return Ok(Outcome::Rejected(rejected));
        }

        if records.is_empty() {
            return Ok(Outcome::Done(Table::new(self.schema.clone(), vec![])));
        }

        let insert = self.insert_stmt(&records)?;

        let write = |_: &Db| self.write_rows(insert, &records);
        let written = if self.db.in_transaction() {
            self.db.savepoint(write)
        } else {
            self.db.transaction(write)
        };

        match written {
            Ok(table) => Ok(Outcome::Done(table)),
            Err(err) => {
                let written: Vec<&Assignments> = records.iter().map(Record::data).collect();
                match self.unique_error(&err, &written) {
                    Some(mut error) => {
                        if error.value.is_none() {
                            error.value = self.stored_duplicate(&error.field, &records);
                        }
                        Err(Error::validation_failed(vec![error]))
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Filters, validates and casts update input.
    pub(super) fn update_assignments<I, K, V>(&self, data: I) -> Result<Outcome<Assignments>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut input = Assignments::new();

        for (key, value) in data {
            let key = key.into();
            let Some(field) = self.schema.field(&key) else {
                continue;
            };

            if field.primary_key {
                return Err(Error::invalid_statement(format!(
                    "update cannot change primary key `{key}` of `{}`",
                    self.table
                )));
            }

            if field.read_only {
                tracing::debug!(table = %self.table, field = %key, "dropping read-only field");
                continue;
            }

            input.insert(key, value.into());
        }

        if input.is_empty() {
            return Err(Error::invalid_statement(format!(
                "update of `{}` sets no fields",
                self.table
            )));
        }

        let validated = validate::validate_partial(&self.schema, &input);
        if !validated.is_valid() {
            let record = Record::from_validated(self.schema.clone(), validated);
            return Ok(Outcome::Rejected(vec![record]));
        }

        Ok(Outcome::Done(validated.data))
    }

    /// Builds the filter of a filtered update or delete, refusing an empty
    /// one.
    pub(super) fn mutation_filter(&self, verb: &str, filter: &Assignments) -> Result<Expr> {
        let expr = Expr::from_filter(filter);
        if expr.is_empty() {
            return Err(self.unfiltered(verb));
        }
        Ok(expr)
    }

    pub(super) fn unfiltered(&self, verb: &str) -> Error {
        Error::invalid_statement(format!(
            "refusing to {verb} every row of `{}` without a filter; use {verb}_all",
            self.table
        ))
    }

    /// Restricts a mutation to rows that are not soft-deleted.
    pub(super) fn live(&self, expr: Expr) -> Expr {
        match &self.config.soft_delete {
            Some(column) => expr.and(Expr::is_null(column.clone())),
            None => expr,
        }
    }

    pub(super) fn live_filter(&self) -> Filter {
        match &self.config.soft_delete {
            Some(column) => Filter::Expr(Expr::is_null(column.clone())),
            None => Filter::All,
        }
    }

    /// Builds the INSERT for already validated records.
    pub(super) fn insert_stmt(&self, records: &[Record]) -> Result<Insert> {
        let serial = self
            .schema
            .identity()
            .filter(|identity| identity.is_serial())
            .map(|identity| identity.field.as_str());

        let mut columns = vec![];
        for field in self.schema.fields() {
            if Some(field.name.as_str()) == serial {
                let given = records.iter().filter(|record| record.id().is_some()).count();
                if given == 0 {
                    continue;
                }
                if given != records.len() {
                    return Err(Error::invalid_statement(format!(
                        "either every row or no row may set serial key `{}`",
                        field.name
                    )));
                }
            }
            columns.push(field.name.as_str());
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| (column.to_string(), record[*column].clone()))
                    .collect()
            })
            .collect();

        Ok(Insert::many(self.table(), rows))
    }

    /// Runs `insert` and reads the written rows back, with `RETURNING` or
    /// with a `SELECT` by key on the same connection.
    pub(super) fn write_rows(&self, insert: Insert, records: &[Record]) -> Result<Table> {
        if self.returning {
            return self.fetch(returning(insert));
        }

        self.db.locked(|_| {
            let response = self.execute(insert)?;
            self.read_back(records, response)
        })
    }

    fn read_back(&self, records: &[Record], response: Response) -> Result<Table> {
        let Some(identity) = self.schema.identity() else {
            return Ok(Table::new(self.schema.clone(), records.to_vec()));
        };

        let keys: Vec<Value> = if records.iter().all(|record| record.id().is_some()) {
            records.iter().filter_map(Record::id).cloned().collect()
        } else {
            let Rows::Count {
                last_insert_id: Some(last),
                ..
            } = response.rows
            else {
                return Err(Error::unsupported_feature(format!(
                    "driver reported no id for rows inserted into `{}`",
                    self.table
                )));
            };

            // Keys of one multi-row insert are consecutive, ending at the
            // reported id.
            let first = last - records.len() as i64 + 1;
            (first..=last).map(Value::I64).collect()
        };

        let query = match &keys[..] {
            [key] => Query::new(self.table()).filter(Expr::eq(identity.field.clone(), key.clone())),
            _ => Query::new(self.table()).filter(Expr::in_list(identity.field.clone(), keys.clone())),
        };

        let mut rows = self.fetch(query)?.into_rows();
        let mut ordered = Vec::with_capacity(rows.len());
        for key in &keys {
            if let Some(index) = rows.iter().position(|row| row.id() == Some(key)) {
                ordered.push(rows.swap_remove(index));
            }
        }

        Ok(Table::new(self.schema.clone(), ordered))
    }

    /// Turns a unique-constraint violation into a `UNIQUE` error on
    /// `record`; any other error is passed on.
    pub(super) fn reject_unique(&self, err: Error, record: Record) -> Result<Record> {
        match self.unique_error(&err, &[record.data()]) {
            Some(error) => {
                tracing::debug!(table = %self.table, field = %error.field, "unique constraint violated");
                Ok(record.with_error_code(&error.field, error.code, error.message))
            }
            None => Err(err),
        }
    }

    fn unique_error(&self, err: &Error, written: &[&Assignments]) -> Option<FieldError> {
        let message = err.driver_message()?;
        let violation = sprig_sql::unique_violation(self.flavor(), self.table(), &message)?;

        let was_written =
            |name: &str| written.iter().any(|data| data.get(name).is_some_and(|v| !v.is_null()));

        let field = violation
            .column
            .filter(|column| self.schema.contains(column))
            .or_else(|| {
                // Prefer declared unique columns over the primary key.
                let unique: Vec<_> = self
                    .schema
                    .fields()
                    .filter(|field| field.is_unique() && was_written(&field.name))
                    .collect();
                unique
                    .iter()
                    .find(|field| !field.primary_key)
                    .or_else(|| unique.first())
                    .map(|field| field.name.clone())
            })?;

        let error = FieldError::new(
            &field,
            ErrorCode::Unique,
            format!("{} is already taken", self.schema.title(&field)),
        );

        // The offending value is known for a single row, or when two rows of
        // a batch repeat it.
        let values: Vec<&Value> = written
            .iter()
            .filter_map(|data| data.get(&field))
            .filter(|value| !value.is_null())
            .collect();
        let value = match &values[..] {
            [value] => Some(*value),
            values => values
                .iter()
                .enumerate()
                .find_map(|(i, value)| values[..i].contains(value).then_some(*value)),
        };

        Some(match value {
            Some(value) => error.with_value(value.clone()),
            None => error,
        })
    }

    /// Looks up which of the batch's values for `field` is already stored.
    fn stored_duplicate(&self, field: &str, records: &[Record]) -> Option<Value> {
        let candidates: Vec<Value> = records
            .iter()
            .filter_map(|record| record.get(field))
            .filter(|value| !value.is_null())
            .cloned()
            .collect();

        // Soft-deleted rows still hold their unique values.
        let query = Query::new(self.table())
            .select([field])
            .filter(Expr::in_list(field, candidates))
            .limit(1);

        match self.fetch_scalar(query) {
            Ok(Value::Null) => None,
            Ok(value) => self
                .schema
                .field(field)
                .and_then(|f| validate::cast(f.ty, &value))
                .or(Some(value)),
            Err(err) => {
                tracing::debug!(table = %self.table, error = %err, "duplicate lookup failed");
                None
            }
        }
    }

    fn now(&self, column: &str) -> Value {
        self.schema
            .field(column)
            .and_then(|field| now_for(field.ty))
            .unwrap_or_else(|| Value::DateTime(Utc::now().naive_utc()))
    }
}

fn returning(mut insert: Insert) -> Insert {
    insert.returning = true;
    insert.terminal = Terminal::Many;
    insert
}

fn now_for(ty: FieldType) -> Option<Value> {
    let now = Utc::now().naive_utc();
    match ty {
        FieldType::DateTime => Some(Value::DateTime(now)),
        FieldType::Date => Some(Value::Date(now.date())),
        FieldType::Time => Some(Value::Time(now.time())),
        _ => None,
    }
}

mod value;
pub(crate) use value::Value;

use rusqlite::Connection as RusqliteConnection;
use sprig_core::{
    driver::{
        Capability, Connection, InterruptHandle, Operation, Response, Sql, ValueSet, Version,
    },
    Error, Result,
};
use sprig_sql::Serializer;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// A SQLite connection.
#[derive(Debug)]
pub struct Sqlite {
    connection: RusqliteConnection,
}

impl Sqlite {
    /// Opens the database named by a `sqlite::memory:` or `sqlite:<path>`
    /// URL.
    pub fn connect(url: &str) -> Result<Sqlite> {
        let parsed = Url::parse(url)
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url}")))?;

        if parsed.scheme() != "sqlite" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `sqlite` scheme; url={url}"
            )));
        }

        match parsed.path() {
            ":memory:" => Sqlite::in_memory(),
            "" => Err(Error::invalid_connection_url(format!(
                "connection URL names no database file; url={url}"
            ))),
            path => Sqlite::open(path),
        }
    }

    /// Opens a fresh in-memory database.
    pub fn in_memory() -> Result<Sqlite> {
        let connection =
            RusqliteConnection::open_in_memory().map_err(Error::driver_operation_failed)?;
        tracing::debug!("opened in-memory SQLite database");
        Ok(Sqlite { connection })
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Sqlite> {
        let path = path.as_ref();
        let connection = RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;
        tracing::debug!(path = %path.display(), "opened SQLite database");
        Ok(Sqlite { connection })
    }

    fn query(&mut self, sql: Sql) -> Result<Response> {
        let mut stmt = self
            .connection
            .prepare_cached(&sql.sql)
            .map_err(Error::driver_operation_failed)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let params: Vec<Value> = sql.params.into_iter().map(Value::from).collect();

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(Error::driver_operation_failed)?;

        let mut values = ValueSet::new(columns);
        while let Some(row) = rows.next().map_err(Error::driver_operation_failed)? {
            let mut items = Vec::with_capacity(width);
            for index in 0..width {
                let value = Value::from_sql(row, index).map_err(Error::driver_operation_failed)?;
                items.push(value.into_inner());
            }
            values.rows.push(items);
        }

        Ok(Response::values(values))
    }

    fn execute(&mut self, sql: Sql) -> Result<Response> {
        let params: Vec<Value> = sql.params.into_iter().map(Value::from).collect();

        let count = {
            let mut stmt = self
                .connection
                .prepare_cached(&sql.sql)
                .map_err(Error::driver_operation_failed)?;

            stmt.execute(rusqlite::params_from_iter(params.iter()))
                .map_err(Error::driver_operation_failed)?
        };

        if is_insert(&sql.sql) && count > 0 {
            let last = self.connection.last_insert_rowid();
            return Ok(Response::inserted(count as u64, Some(last)));
        }

        Ok(Response::count(count as u64))
    }
}

impl Connection for Sqlite {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    fn server_version(&self) -> Option<Version> {
        rusqlite::version().parse().ok()
    }

    fn exec(&mut self, op: Operation) -> Result<Response> {
        match op {
            Operation::Query(sql) => self.query(sql),
            Operation::Execute(sql) => self.execute(sql),
            Operation::Transaction(op) => {
                self.connection
                    .execute_batch(&Serializer::sqlite().serialize_transaction(op))
                    .map_err(Error::driver_operation_failed)?;
                Ok(Response::count(0))
            }
        }
    }

    fn interrupt_handle(&self) -> Option<InterruptHandle> {
        let handle = self.connection.get_interrupt_handle();
        Some(Arc::new(move || handle.interrupt()))
    }
}

fn is_insert(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|keyword| keyword.eq_ignore_ascii_case("INSERT"))
}

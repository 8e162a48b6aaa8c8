use crate::logging::{LoggingConnection, OpLog};

use sprig::driver::{Backend, Operation, Sql};
use sprig::{binding::Builder, Db, Schema};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

/// A database handle for one test, with the operations log of its
/// connection.
///
/// Against SQLite every test gets its own in-memory database. Against a
/// server, table names get a per-test suffix and the tables are dropped
/// when the `TestDb` goes away.
pub struct TestDb {
    pub db: Db,
    log: OpLog,
    tables: Mutex<Vec<String>>,
}

impl TestDb {
    pub fn new() -> TestDb {
        init_tracing();

        let url = database_url();
        let conn = sprig::db::connection(&url)
            .unwrap_or_else(|err| panic!("failed to connect to {url}: {err}"));
        let conn = LoggingConnection::new(conn);
        let log = conn.log();

        TestDb {
            db: Db::new(conn),
            log,
            tables: Mutex::new(vec![]),
        }
    }

    pub fn log(&self) -> &OpLog {
        &self.log
    }

    pub fn backend(&self) -> Backend {
        self.db.capability().backend
    }

    /// Starts binding `schema` to a table named after `table`.
    pub fn binding(&self, schema: impl Into<Arc<Schema>>, table: &str) -> Builder {
        let table = self.table_name(table);
        self.tables.lock().unwrap().push(table.clone());
        self.db.binding(schema, table)
    }

    /// The physical name used for `table` in this test.
    pub fn table_name(&self, table: &str) -> String {
        static NEXT: AtomicUsize = AtomicUsize::new(0);

        match self.backend() {
            Backend::Sqlite => table.to_string(),
            _ => format!(
                "{table}_{}_{}",
                std::process::id(),
                NEXT.fetch_add(1, Ordering::Relaxed)
            ),
        }
    }
}

impl Default for TestDb {
    fn default() -> Self {
        TestDb::new()
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if self.backend() == Backend::Sqlite {
            return;
        }

        for table in self.tables.lock().unwrap().drain(..) {
            let sql = Sql::new(format!("DROP TABLE IF EXISTS {table}"), vec![]);
            if let Err(err) = self.db.exec(Operation::Execute(sql)) {
                tracing::warn!(table = %table, error = %err, "failed to drop test table");
            }
        }
    }
}

fn database_url() -> String {
    if cfg!(feature = "postgresql") {
        std::env::var("SPRIG_TEST_POSTGRESQL_URL")
            .unwrap_or_else(|_| "postgresql://localhost:5432/sprig_test".to_string())
    } else if cfg!(feature = "mysql") {
        std::env::var("SPRIG_TEST_MYSQL_URL")
            .unwrap_or_else(|_| "mysql://localhost:3306/sprig_test".to_string())
    } else {
        "sqlite::memory:".to_string()
    }
}

/// Installs a `tracing` subscriber filtered by `RUST_LOG`, once per test
/// binary.
pub fn init_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

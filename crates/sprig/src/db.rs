mod connect;
pub use connect::connection;
mod transaction;

use crate::binding::Builder;
use crate::{CancelToken, Result, Schema};

use parking_lot::ReentrantMutex;
use sprig_core::driver::{
    Capability, Connection, InterruptHandle, Operation, Response, Sql, Transaction, Version,
};
use sprig_sql::{Flavor, Serializer};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

/// A database handle.
///
/// Cloning is cheap; clones share one connection. Calls from different
/// threads are serialized, and while a transaction is open only the thread
/// that opened it can use the connection.
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
    cancel: Option<CancelToken>,
}

/// Shared state between all `Db` clones.
struct Shared {
    conn: ReentrantMutex<RefCell<Conn>>,
    capability: &'static Capability,
    server_version: Option<Version>,
    serializer: Serializer,
    interrupt: Option<InterruptHandle>,
}

struct Conn {
    driver: Box<dyn Connection>,

    /// Number of `transaction` calls currently open on this connection.
    depth: usize,

    /// Last savepoint id handed out.
    savepoint: usize,
}

impl Db {
    /// Wraps an open driver connection.
    pub fn new(driver: impl Connection + 'static) -> Db {
        Db::from_boxed(Box::new(driver))
    }

    pub(crate) fn from_boxed(driver: Box<dyn Connection>) -> Db {
        let capability = driver.capability();
        let server_version = driver.server_version();
        let interrupt = driver.interrupt_handle();
        let serializer = Serializer::new(Flavor::from_backend(capability.backend));

        tracing::debug!(
            backend = ?capability.backend,
            server_version = ?server_version,
            "database handle opened"
        );

        Db {
            shared: Arc::new(Shared {
                conn: ReentrantMutex::new(RefCell::new(Conn {
                    driver,
                    depth: 0,
                    savepoint: 0,
                })),
                capability,
                server_version,
                serializer,
                interrupt,
            }),
            cancel: None,
        }
    }

    /// Returns a handle that checks `token` before every statement. Other
    /// clones are unaffected.
    pub fn with_cancel_token(&self, token: CancelToken) -> Db {
        if let Some(interrupt) = &self.shared.interrupt {
            token.on_cancel(interrupt.clone());
        }

        Db {
            shared: self.shared.clone(),
            cancel: Some(token),
        }
    }

    pub fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }

    pub fn capability(&self) -> &'static Capability {
        self.shared.capability
    }

    pub fn server_version(&self) -> Option<Version> {
        self.shared.server_version
    }

    pub fn flavor(&self) -> Flavor {
        self.shared.serializer.flavor()
    }

    pub fn serializer(&self) -> &Serializer {
        &self.shared.serializer
    }

    /// Starts binding `schema` to `table`. See [`Builder`].
    pub fn binding(&self, schema: impl Into<Arc<Schema>>, table: impl Into<String>) -> Builder {
        Builder::new(self.clone(), schema.into(), table.into())
    }

    /// `true` while the calling thread has a transaction open.
    pub fn in_transaction(&self) -> bool {
        let guard = self.shared.conn.lock();
        let depth = guard.borrow().depth;
        depth > 0
    }

    /// Sends one operation to the driver.
    ///
    /// Fails with a `cancelled` error, without reaching the driver, when the
    /// attached cancel token has fired. Rollbacks are always let through.
    pub fn exec(&self, op: Operation) -> Result<Response> {
        if !matches!(
            op,
            Operation::Transaction(Transaction::Rollback | Transaction::RollbackToSavepoint(_))
        ) {
            if let Some(token) = &self.cancel {
                token.check()?;
            }
        }

        let guard = self.shared.conn.lock();
        let mut conn = guard.borrow_mut();
        conn.driver.exec(op)
    }

    /// Round-trips a trivial query to check the connection is alive.
    pub fn ping(&self) -> Result<()> {
        self.exec(Operation::Query(Sql::new("SELECT 1", vec![])))?;
        Ok(())
    }

    /// Runs `f` while holding the connection, so every statement it issues
    /// from this thread reaches the database back to back.
    pub(crate) fn locked<R>(&self, f: impl FnOnce(&Db) -> Result<R>) -> Result<R> {
        let _guard = self.shared.conn.lock();
        f(self)
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("backend", &self.shared.capability.backend)
            .field("server_version", &self.shared.server_version)
            .field("cancel", &self.cancel)
            .finish()
    }
}

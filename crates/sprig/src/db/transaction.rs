use super::Db;
use crate::Result;

use sprig_core::driver::{Operation, Transaction};
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

impl Db {
    /// Runs `f` inside one database transaction.
    ///
    /// Returning `Ok` commits; returning `Err` or panicking rolls back, and
    /// the error (or panic) is passed on. A failed rollback is logged and
    /// the original error returned.
    ///
    /// Calls nested inside `f` join the outer transaction: only the
    /// outermost call sends `BEGIN` and `COMMIT`, and an error that escapes
    /// the outermost `f` rolls back everything.
    pub fn transaction<R>(&self, f: impl FnOnce(&Db) -> Result<R>) -> Result<R> {
        let guard = self.shared.conn.lock();

        let depth = {
            let mut conn = guard.borrow_mut();
            conn.depth += 1;
            conn.depth
        };

        let result = if depth > 1 {
            tracing::trace!(depth, "joining open transaction");
            catch_unwind(AssertUnwindSafe(|| f(self)))
        } else {
            self.root_transaction(f)
        };

        guard.borrow_mut().depth -= 1;
        drop(guard);

        match result {
            Ok(result) => result,
            Err(panic) => resume_unwind(panic),
        }
    }

    /// Runs `f` behind a savepoint when a transaction is open, so a
    /// statement that fails inside `f` is undone on its own and the open
    /// transaction stays usable. Outside a transaction `f` runs as is.
    ///
    /// PostgreSQL aborts the whole transaction on any failed statement;
    /// callers that turn a database error into a value (a `UNIQUE` field
    /// error, say) must go through here.
    pub(crate) fn savepoint<R>(&self, f: impl FnOnce(&Db) -> Result<R>) -> Result<R> {
        let guard = self.shared.conn.lock();

        let id = {
            let mut conn = guard.borrow_mut();
            if conn.depth == 0 {
                None
            } else {
                conn.savepoint += 1;
                Some(conn.savepoint)
            }
        };

        let Some(id) = id else {
            return f(self);
        };

        self.exec(Operation::Transaction(Transaction::Savepoint(id)))?;

        let result = f(self);

        let end = match &result {
            Ok(_) => self.exec(Operation::Transaction(Transaction::ReleaseSavepoint(id))),
            Err(err) => {
                tracing::debug!(savepoint = id, error = %err, "rolling back to savepoint");
                self.exec(Operation::Transaction(Transaction::RollbackToSavepoint(id)))
            }
        };

        drop(guard);

        match (result, end) {
            (Ok(value), Ok(_)) => Ok(value),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(_)) => Err(err),
            // The transaction is unusable now; report that, not the
            // statement's own error.
            (Err(err), Err(rollback)) => {
                tracing::warn!(savepoint = id, error = %err, "rollback to savepoint failed");
                Err(rollback)
            }
        }
    }

    fn root_transaction<R>(
        &self,
        f: impl FnOnce(&Db) -> Result<R>,
    ) -> std::thread::Result<Result<R>> {
        if let Err(err) = self.exec(Operation::Transaction(Transaction::Start)) {
            return Ok(Err(err));
        }

        tracing::debug!("transaction started");

        let result = catch_unwind(AssertUnwindSafe(|| f(self)));

        match &result {
            Ok(Ok(_)) => {
                if let Err(err) = self.exec(Operation::Transaction(Transaction::Commit)) {
                    tracing::warn!(error = %err, "commit failed; rolling back transaction");
                    self.rollback();
                    return Ok(Err(err));
                }
                tracing::debug!("transaction committed");
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "rolling back transaction");
                self.rollback();
            }
            Err(_) => {
                tracing::warn!("rolling back transaction after panic");
                self.rollback();
            }
        }

        result
    }

    fn rollback(&self) {
        match self.exec(Operation::Transaction(Transaction::Rollback)) {
            Ok(_) => tracing::debug!("transaction rolled back"),
            Err(err) => tracing::warn!(error = %err, "rollback failed"),
        }
    }
}

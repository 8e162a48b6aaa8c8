use sprig::driver::{
    Capability, Connection, InterruptHandle, Operation, Response, Transaction, Version,
};
use sprig::Result;
use std::sync::{Arc, Mutex};

/// A connection wrapper that records every operation before forwarding it.
#[derive(Debug)]
pub struct LoggingConnection {
    inner: Box<dyn Connection>,
    log: OpLog,
}

impl LoggingConnection {
    pub fn new(inner: Box<dyn Connection>) -> LoggingConnection {
        LoggingConnection {
            inner,
            log: OpLog::default(),
        }
    }

    /// Handle to the operations log; stays valid after the connection is
    /// moved into a `Db`.
    pub fn log(&self) -> OpLog {
        self.log.clone()
    }
}

impl Connection for LoggingConnection {
    fn capability(&self) -> &'static Capability {
        self.inner.capability()
    }

    fn server_version(&self) -> Option<Version> {
        self.inner.server_version()
    }

    fn exec(&mut self, op: Operation) -> Result<Response> {
        self.log.push(op.clone());
        self.inner.exec(op)
    }

    fn interrupt_handle(&self) -> Option<InterruptHandle> {
        self.inner.interrupt_handle()
    }
}

/// Operations sent through a [`LoggingConnection`], oldest first.
#[derive(Debug, Clone, Default)]
pub struct OpLog {
    ops: Arc<Mutex<Vec<Operation>>>,
}

impl OpLog {
    fn push(&self, op: Operation) {
        self.ops.lock().unwrap().push(op);
    }

    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ops(&self) -> Vec<Operation> {
        self.ops.lock().unwrap().clone()
    }

    /// SQL text of every query and statement, skipping transaction control.
    pub fn sql(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Operation::Query(sql) | Operation::Execute(sql) => Some(sql.sql),
                Operation::Transaction(_) => None,
            })
            .collect()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Operation::Transaction(op) => Some(op),
                _ => None,
            })
            .collect()
    }
}

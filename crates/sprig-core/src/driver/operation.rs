use crate::stmt::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// A statement that returns rows.
    Query(Sql),

    /// A statement run for its effect; returns an affected-row count.
    Execute(Sql),

    /// Transaction control.
    Transaction(Transaction),
}

/// Compiled SQL text with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Sql {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Start,
    Commit,
    Rollback,

    /// Marks a point inside the open transaction that can be rolled back
    /// to without ending it. Savepoints are numbered by nesting depth.
    Savepoint(usize),
    ReleaseSavepoint(usize),
    RollbackToSavepoint(usize),
}

impl Sql {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Sql {
        Sql {
            sql: sql.into(),
            params,
        }
    }
}

impl Operation {
    pub fn is_transaction(&self) -> bool {
        matches!(self, Operation::Transaction(_))
    }

    pub fn sql(&self) -> Option<&Sql> {
        match self {
            Operation::Query(sql) | Operation::Execute(sql) => Some(sql),
            Operation::Transaction(_) => None,
        }
    }
}

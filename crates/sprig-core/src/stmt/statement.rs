use super::{Delete, Insert, Query, Update};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Query(Query),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

/// Result shape the evaluator asked for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// Every matching row, as a table.
    #[default]
    Many,

    /// The first matching row, or null. Queries get an implicit `LIMIT 1`.
    One,

    /// Number of matching rows for a query, affected rows for a mutation.
    Count,

    /// Whether any row matches. Queries only.
    Exists,

    /// Run for effect; nothing is returned.
    Execute,
}

impl Statement {
    pub fn table(&self) -> &str {
        match self {
            Statement::Query(stmt) => &stmt.table,
            Statement::Insert(stmt) => &stmt.table,
            Statement::Update(stmt) => &stmt.table,
            Statement::Delete(stmt) => &stmt.table,
        }
    }

    pub fn terminal(&self) -> Terminal {
        match self {
            Statement::Query(stmt) => stmt.terminal,
            Statement::Insert(stmt) => stmt.terminal,
            Statement::Update(stmt) => stmt.terminal,
            Statement::Delete(stmt) => stmt.terminal,
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Statement::Query(_))
    }
}

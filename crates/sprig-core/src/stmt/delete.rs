use super::{Filter, Statement, Terminal};

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub filter: Filter,
    pub terminal: Terminal,
}

impl Delete {
    pub fn new(table: impl Into<String>, filter: impl Into<Filter>) -> Delete {
        Delete {
            table: table.into(),
            filter: filter.into(),
            terminal: Terminal::Count,
        }
    }

    /// Deletes every row of the table.
    pub fn all(table: impl Into<String>) -> Delete {
        Delete::new(table, Filter::All)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}

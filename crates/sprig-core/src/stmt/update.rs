use super::{Assignments, Filter, Statement, Terminal};

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Assignments,
    pub filter: Filter,

    /// Append `RETURNING *`. Set by the binding layer once it confirmed the
    /// database supports it.
    pub returning: bool,

    pub terminal: Terminal,
}

impl Update {
    pub fn new(
        table: impl Into<String>,
        filter: impl Into<Filter>,
        assignments: Assignments,
    ) -> Update {
        Update {
            table: table.into(),
            assignments,
            filter: filter.into(),
            returning: false,
            terminal: Terminal::Count,
        }
    }

    /// Updates every row of the table.
    pub fn all(table: impl Into<String>, assignments: Assignments) -> Update {
        Update::new(table, Filter::All, assignments)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}

use super::{Assignments, Statement, Terminal};

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,

    /// One entry per row. All rows must assign the same columns in the same
    /// order; the serializer takes the column list from the first row.
    pub rows: Vec<Assignments>,

    pub on_conflict: Option<OnConflict>,

    /// Append `RETURNING *`. Set by the binding layer once it confirmed the
    /// database supports it.
    pub returning: bool,

    pub terminal: Terminal,
}

/// Upsert behavior: when a row collides on `columns`, overwrite the row's
/// other assigned columns instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    pub columns: Vec<String>,

    /// Assigned columns that keep their stored value on conflict, such as a
    /// generated primary key.
    pub keep: Vec<String>,
}

impl Insert {
    pub fn new(table: impl Into<String>, row: Assignments) -> Insert {
        Insert {
            terminal: Terminal::One,
            ..Insert::many(table, vec![row])
        }
    }

    pub fn many(table: impl Into<String>, rows: Vec<Assignments>) -> Insert {
        Insert {
            table: table.into(),
            rows,
            on_conflict: None,
            returning: false,
            terminal: Terminal::Many,
        }
    }

    pub fn on_conflict<I, S>(mut self, columns: I) -> Insert
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.on_conflict = Some(OnConflict {
            columns: columns.into_iter().map(Into::into).collect(),
            keep: vec![],
        });
        self
    }

    /// Columns an upsert must not overwrite. Has no effect without
    /// [`Insert::on_conflict`].
    pub fn keep_on_conflict<I, S>(mut self, columns: I) -> Insert
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(on_conflict) = &mut self.on_conflict {
            on_conflict
                .keep
                .extend(columns.into_iter().map(Into::into));
        }
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.rows
            .first()
            .into_iter()
            .flat_map(|row| row.keys().map(String::as_str))
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

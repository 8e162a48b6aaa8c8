use crate::{Error, Record, Result};

/// Result of a write that validates its input first.
///
/// Invalid input is data, not an error: the records come back with their
/// field errors and nothing was sent to the database.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Done(T),
    Rejected(Vec<Record>),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    /// Records that failed validation; empty when the write went through.
    pub fn rejected(&self) -> &[Record] {
        match self {
            Outcome::Done(_) => &[],
            Outcome::Rejected(records) => records,
        }
    }

    /// Escalates a rejection into a validation error, for use with `?`
    /// inside a transaction.
    pub fn into_result(self) -> Result<T> {
        match self {
            Outcome::Done(value) => Ok(value),
            Outcome::Rejected(records) => Err(Error::validation_failed(
                records.iter().flat_map(Record::error_list).collect(),
            )),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(value) => Outcome::Done(f(value)),
            Outcome::Rejected(records) => Outcome::Rejected(records),
        }
    }
}

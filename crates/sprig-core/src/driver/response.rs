use crate::stmt::Value;
use crate::{Error, Result};

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows impacted by the operation, plus the id the database
    /// assigned to the last inserted row when it reports one.
    Count {
        affected: u64,
        last_insert_id: Option<i64>,
    },

    /// Operation result, fully read.
    Values(ValueSet),
}

/// Rows returned by a query: column names plus one value vector per row.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValueSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Response {
    pub fn count(affected: u64) -> Self {
        Self {
            rows: Rows::Count {
                affected,
                last_insert_id: None,
            },
        }
    }

    pub fn inserted(affected: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            rows: Rows::Count {
                affected,
                last_insert_id,
            },
        }
    }

    pub fn values(values: ValueSet) -> Self {
        Self {
            rows: Rows::Values(values),
        }
    }

    pub fn empty() -> Self {
        Self::count(0)
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count { .. })
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    pub fn into_count(self) -> Result<u64> {
        match self {
            Rows::Count { affected, .. } => Ok(affected),
            Rows::Values(values) => Ok(values.rows.len() as u64),
        }
    }

    pub fn into_values(self) -> Result<ValueSet> {
        match self {
            Rows::Values(values) => Ok(values),
            Rows::Count { .. } => Err(Error::from_args(format_args!(
                "expected rows from the driver, got an affected-row count"
            ))),
        }
    }
}

impl ValueSet {
    pub fn new(columns: Vec<String>) -> ValueSet {
        ValueSet {
            columns,
            rows: vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first column of the first row, or `Null` if there are no rows.
    pub fn scalar(&self) -> Value {
        self.rows
            .first()
            .and_then(|row| row.first())
            .cloned()
            .unwrap_or(Value::Null)
    }
}

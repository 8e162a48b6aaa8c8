use super::TableBinding;
use crate::{Error, Result};

use sprig_core::ident;
use sprig_core::stmt::{Aggregate, AggregateFunc, Assignments, Terminal, Value};
use sprig_core::validate;

impl TableBinding {
    /// Number of live rows matching `filter`.
    pub fn count(&self, filter: &Assignments) -> Result<u64> {
        let value = self.fetch_scalar(self.matching(filter).terminal(Terminal::Count))?;
        count_from(value)
    }

    /// Number of matching rows where `column` is not null.
    pub fn count_column(&self, column: &str, filter: &Assignments) -> Result<u64> {
        let value = self.aggregate(AggregateFunc::Count, column, filter)?;
        count_from(value)
    }

    /// Sum of `column` over matching rows; `Null` when no row matches.
    pub fn sum(&self, column: &str, filter: &Assignments) -> Result<Value> {
        self.aggregate(AggregateFunc::Sum, column, filter)
    }

    /// Mean of `column`, always as a float; `Null` when no row matches.
    pub fn avg(&self, column: &str, filter: &Assignments) -> Result<Value> {
        self.aggregate(AggregateFunc::Avg, column, filter)
    }

    pub fn min(&self, column: &str, filter: &Assignments) -> Result<Value> {
        self.aggregate(AggregateFunc::Min, column, filter)
    }

    pub fn max(&self, column: &str, filter: &Assignments) -> Result<Value> {
        self.aggregate(AggregateFunc::Max, column, filter)
    }

    fn aggregate(&self, func: AggregateFunc, column: &str, filter: &Assignments) -> Result<Value> {
        ident::validate_identifier(column)
            .map_err(|err| err.context(format!("{}()", func.as_sql().to_lowercase())))?;

        let query = self
            .matching(filter)
            .aggregate(Aggregate::new(func, Some(column), "value"));

        let raw = self.fetch_scalar(query)?;

        Ok(match (func, &raw) {
            (_, Value::Null) => raw,
            (AggregateFunc::Avg, _) => float_from(raw)?,
            (AggregateFunc::Count, _) => raw,
            // Drivers may widen the result (NUMERIC, DOUBLE); read it back
            // through the field type where that works.
            (_, _) => match self.schema.field(column) {
                Some(field) => validate::cast_aggregate(field.ty, &raw).unwrap_or(raw),
                None => raw,
            },
        })
    }
}

pub(super) fn count_from(value: Value) -> Result<u64> {
    match value {
        Value::Null => Ok(0),
        Value::I64(n) => u64::try_from(n).map_err(|_| Error::type_conversion(value, "u64")),
        Value::F64(n) if n.fract() == 0.0 && n >= 0.0 => Ok(n as u64),
        Value::String(ref s) => s
            .parse()
            .map_err(|_| Error::type_conversion(value.clone(), "u64")),
        value => Err(Error::type_conversion(value, "u64")),
    }
}

/// MySQL returns `AVG` as a decimal, which drivers hand over as text.
fn float_from(value: Value) -> Result<Value> {
    match value {
        Value::F64(_) => Ok(value),
        Value::I64(n) => Ok(Value::F64(n as f64)),
        Value::String(ref s) => s
            .trim()
            .parse()
            .map(Value::F64)
            .map_err(|_| Error::type_conversion(value.clone(), "f64")),
        value => Err(Error::type_conversion(value, "f64")),
    }
}

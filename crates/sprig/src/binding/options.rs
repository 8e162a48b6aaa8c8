use crate::{Error, Result};

use indexmap::IndexMap;
use sprig_core::ident::{self, Direction};
use sprig_core::stmt::{OrderBy, Query, Value};

/// Ordering, projection and paging for a read.
///
/// Every column name and direction is validated when the options are built,
/// whether through the typed builders or [`QueryOptions::from_map`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QueryOptions {
    order_by: Vec<OrderBy>,
    select: Option<Vec<String>>,
    limit: Option<Limit>,
    offset: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Rows(u64),

    /// Explicitly no limit, spelled `limit <= 0` in host maps.
    Unbounded,
}

impl QueryOptions {
    pub fn new() -> QueryOptions {
        QueryOptions::default()
    }

    /// Parses options from the host's map shape:
    ///
    /// - `orderBy`: a column name (direction from `order`, default `asc`),
    ///   or a list of `[column, direction]` pairs;
    /// - `select`: a list of column names;
    /// - `limit`: an integer; zero or less means no limit;
    /// - `offset`: a non-negative integer.
    ///
    /// Other keys are ignored.
    pub fn from_map(map: &IndexMap<String, Value>) -> Result<QueryOptions> {
        let mut options = QueryOptions::default();

        match map.get("orderBy") {
            None | Some(Value::Null) => {}
            Some(Value::String(column)) => {
                let direction = match map.get("order") {
                    Some(Value::String(order)) => Direction::parse(order)?,
                    None | Some(Value::Null) => Direction::Asc,
                    Some(other) => {
                        return Err(invalid(format!(
                            "order must be 'asc' or 'desc', got {}",
                            other.type_name()
                        )))
                    }
                };
                options = options.order_by(column, direction)?;
            }
            Some(Value::List(pairs)) => {
                for pair in pairs {
                    let Value::List(pair) = pair else {
                        return Err(invalid("orderBy array elements must be [column, direction] pairs"));
                    };

                    match &pair[..] {
                        [Value::String(column), Value::String(direction)] => {
                            options = options.order_by(column, Direction::parse(direction)?)?;
                        }
                        [_, _] => {
                            return Err(invalid("orderBy column and direction must be strings"))
                        }
                        _ => {
                            return Err(invalid(
                                "orderBy array elements must be [column, direction] pairs",
                            ))
                        }
                    }
                }
            }
            Some(other) => {
                return Err(invalid(format!(
                    "orderBy must be a column name or a list of pairs, got {}",
                    other.type_name()
                )))
            }
        }

        match map.get("select") {
            None | Some(Value::Null) => {}
            Some(Value::List(columns)) => {
                let columns = columns
                    .iter()
                    .map(|column| match column {
                        Value::String(column) => Ok(column.as_str()),
                        _ => Err(invalid("select columns must be strings")),
                    })
                    .collect::<Result<Vec<_>>>()?;
                options = options.select(columns)?;
            }
            Some(_) => return Err(invalid("select must be an array of column names")),
        }

        match map.get("limit") {
            None | Some(Value::Null) => {}
            Some(Value::I64(limit)) if *limit <= 0 => options = options.no_limit(),
            Some(Value::I64(limit)) => options = options.limit(*limit as u64),
            Some(other) => {
                return Err(invalid(format!(
                    "limit must be an integer, got {}",
                    other.type_name()
                )))
            }
        }

        match map.get("offset") {
            None | Some(Value::Null) => {}
            // Negative offsets are ignored rather than rejected.
            Some(Value::I64(offset)) if *offset < 0 => {}
            Some(Value::I64(offset)) => options = options.offset(*offset as u64),
            Some(other) => {
                return Err(invalid(format!(
                    "offset must be an integer, got {}",
                    other.type_name()
                )))
            }
        }

        Ok(options)
    }

    /// Appends a sort key.
    pub fn order_by(mut self, column: &str, direction: Direction) -> Result<QueryOptions> {
        ident::validate_identifier(column).map_err(|err| err.context("orderBy"))?;
        self.order_by.push(OrderBy::new(column, direction));
        Ok(self)
    }

    pub fn asc(self, column: &str) -> Result<QueryOptions> {
        self.order_by(column, Direction::Asc)
    }

    pub fn desc(self, column: &str) -> Result<QueryOptions> {
        self.order_by(column, Direction::Desc)
    }

    /// Restricts the returned columns.
    pub fn select<I, S>(mut self, columns: I) -> Result<QueryOptions>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = columns
            .into_iter()
            .map(|column| {
                let column = column.as_ref();
                ident::validate_identifier(column).map_err(|err| err.context("select"))?;
                Ok(column.to_string())
            })
            .collect::<Result<Vec<_>>>()?;

        self.select = Some(columns);
        Ok(self)
    }

    pub fn limit(mut self, limit: u64) -> QueryOptions {
        self.limit = Some(Limit::Rows(limit));
        self
    }

    pub fn no_limit(mut self) -> QueryOptions {
        self.limit = Some(Limit::Unbounded);
        self
    }

    pub fn offset(mut self, offset: u64) -> QueryOptions {
        self.offset = Some(offset);
        self
    }

    pub fn get_order_by(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn get_select(&self) -> Option<&[String]> {
        self.select.as_deref()
    }

    pub fn get_limit(&self) -> Option<Limit> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<u64> {
        self.offset
    }

    /// Same options with every sort direction flipped.
    pub(super) fn reversed(&self) -> QueryOptions {
        QueryOptions {
            order_by: self.order_by.iter().map(OrderBy::reverse).collect(),
            ..self.clone()
        }
    }

    /// Applies ordering and projection. Paging is left to the caller, since
    /// each read treats limits differently.
    pub(super) fn shape(&self, mut query: Query) -> Query {
        if let Some(columns) = &self.select {
            query = query.select(columns.iter().cloned());
        }

        for order_by in &self.order_by {
            query = query.order_by(order_by.clone());
        }

        query
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::invalid_statement(message.into()).context("query options")
}

use super::{Limit, QueryOptions, TableBinding};
use crate::{Error, Record, Result, Table};

use sprig_core::stmt::{Assignments, Expr, OrderBy, Query, Terminal, Value};

impl TableBinding {
    /// Every row, paged.
    ///
    /// Without a limit the configured default cap applies; an explicit limit
    /// is clamped to the configured maximum. [`QueryOptions::no_limit`]
    /// lifts the cap.
    pub fn all(&self, options: &QueryOptions) -> Result<Table> {
        let query = options.shape(self.query());

        let limit = match options.get_limit() {
            None => Some(self.config.default_limit),
            Some(Limit::Rows(limit)) if limit > self.config.max_limit => {
                tracing::warn!(
                    table = %self.table,
                    requested = limit,
                    max = self.config.max_limit,
                    "clamping limit"
                );
                Some(self.config.max_limit)
            }
            Some(Limit::Rows(limit)) => Some(limit),
            Some(Limit::Unbounded) => None,
        };

        self.fetch(page(query, limit, options.get_offset()))
    }

    /// Rows matching every `column = value` pair of `filter`. No row cap is
    /// applied unless `options` sets a limit.
    pub fn filter(&self, filter: &Assignments, options: &QueryOptions) -> Result<Table> {
        let query = options.shape(self.matching(filter));

        let limit = match options.get_limit() {
            Some(Limit::Rows(limit)) => Some(limit),
            None | Some(Limit::Unbounded) => None,
        };

        self.fetch(page(query, limit, options.get_offset()))
    }

    /// The row whose primary key equals `id`.
    pub fn find(&self, id: impl Into<Value>) -> Result<Option<Record>> {
        let Some(identity) = self.schema.identity() else {
            return Err(Error::invalid_statement(format!(
                "`find` needs a primary key, and schema `{}` has none",
                self.schema.name()
            )));
        };

        let query = self
            .query()
            .filter(Expr::eq(identity.field.clone(), id.into()))
            .terminal(Terminal::One);

        self.fetch_one(query)
    }

    /// The first row by primary key, or by `options`' ordering when it has
    /// one.
    pub fn first(&self, options: &QueryOptions) -> Result<Option<Record>> {
        self.fetch_one(self.edge(options, false).terminal(Terminal::One))
    }

    /// Up to `n` rows from the start, ordered like [`TableBinding::first`].
    pub fn first_n(&self, n: u64, options: &QueryOptions) -> Result<Table> {
        self.fetch(self.edge(options, false).limit(n))
    }

    /// The last row: [`TableBinding::first`] with every sort direction
    /// reversed.
    pub fn last(&self, options: &QueryOptions) -> Result<Option<Record>> {
        self.fetch_one(self.edge(options, true).terminal(Terminal::One))
    }

    pub fn last_n(&self, n: u64, options: &QueryOptions) -> Result<Table> {
        self.fetch(self.edge(options, true).limit(n))
    }

    /// Whether any row matches `filter`. Never reads row data.
    pub fn exists(&self, filter: &Assignments) -> Result<bool> {
        let query = self.matching(filter).terminal(Terminal::Exists);

        Ok(!self.fetch_rows(query)?.is_empty())
    }

    /// The first row matching `filter`.
    pub fn find_by(&self, filter: &Assignments, options: &QueryOptions) -> Result<Option<Record>> {
        let query = options.shape(self.matching(filter)).terminal(Terminal::One);

        let query = match options.get_offset() {
            Some(offset) => query.offset(offset),
            None => query,
        };

        self.fetch_one(query)
    }

    fn edge(&self, options: &QueryOptions, reverse: bool) -> Query {
        if options.get_order_by().is_empty() {
            let key = OrderBy::asc(self.key_column());
            let key = if reverse { key.reverse() } else { key };
            return options.shape(self.query()).order_by(key);
        }

        if reverse {
            options.reversed().shape(self.query())
        } else {
            options.shape(self.query())
        }
    }
}

fn page(query: Query, limit: Option<u64>, offset: Option<u64>) -> Query {
    match (limit, offset) {
        (Some(limit), offset) => query.limit(limit).offset(offset.unwrap_or(0)),
        (None, Some(offset)) => query.offset(offset),
        (None, None) => query,
    }
}

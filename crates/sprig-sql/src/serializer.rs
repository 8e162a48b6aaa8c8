#[macro_use]
mod fmt;
use fmt::ToSql;

mod create_table;

mod delim;
use delim::{Comma, Delimited};

mod flavor;
pub use flavor::Flavor;

mod ident;
use ident::Ident;

mod params;
pub use params::{Params, Placeholder};

// Fragment serializers
mod expr;
mod statement;
mod value;

use sprig_core::{driver::Transaction, schema::Schema, stmt::Statement, Result};

/// Serialize a statement to a SQL string
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl Serializer {
    pub fn new(flavor: Flavor) -> Serializer {
        Serializer { flavor }
    }

    pub fn sqlite() -> Serializer {
        Serializer::new(Flavor::Sqlite)
    }

    pub fn postgresql() -> Serializer {
        Serializer::new(Flavor::Postgresql)
    }

    pub fn mysql() -> Serializer {
        Serializer::new(Flavor::Mysql)
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Serializes a query or mutation. Every table and column name is
    /// validated on the way out; values become placeholders pushed to
    /// `params`.
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> Result<String> {
        let sql = self.with_formatter(params, |f| stmt.to_sql(f))?;
        tracing::trace!(sql = %sql, "serialized statement");
        Ok(sql)
    }

    /// Serializes `CREATE TABLE IF NOT EXISTS` for `schema` bound to `table`.
    pub fn serialize_create_table(&self, schema: &Schema, table: &str) -> Result<String> {
        let mut params = NoParams;
        self.with_formatter(&mut params, |f| {
            create_table::CreateTable { schema, table }.to_sql(f)
        })
    }

    /// Serialize a transaction control operation to a SQL string.
    ///
    /// MySQL uses `START TRANSACTION` while the other databases use `BEGIN`.
    pub fn serialize_transaction(&self, op: Transaction) -> String {
        match op {
            Transaction::Start => self.flavor.begin().to_string(),
            Transaction::Commit => "COMMIT".to_string(),
            Transaction::Rollback => "ROLLBACK".to_string(),
            Transaction::Savepoint(id) => format!("SAVEPOINT sp_{id}"),
            Transaction::ReleaseSavepoint(id) => format!("RELEASE SAVEPOINT sp_{id}"),
            Transaction::RollbackToSavepoint(id) => format!("ROLLBACK TO SAVEPOINT sp_{id}"),
        }
    }

    fn with_formatter<P: Params>(
        &self,
        params: &mut P,
        serialize: impl FnOnce(&mut Formatter<'_, P>) -> Result<()>,
    ) -> Result<String> {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        serialize(&mut fmt)?;
        Ok(ret)
    }

    fn is_mysql(&self) -> bool {
        matches!(self.flavor, Flavor::Mysql)
    }

    fn is_sqlite(&self) -> bool {
        matches!(self.flavor, Flavor::Sqlite)
    }

    fn is_postgresql(&self) -> bool {
        matches!(self.flavor, Flavor::Postgresql)
    }
}

/// DDL never binds parameters; literals are rendered inline.
struct NoParams;

impl Params for NoParams {
    fn push(&mut self, _: &sprig_core::stmt::Value) -> Placeholder {
        Placeholder(0)
    }
}

pub mod binding;
pub use binding::{BindingConfig, Outcome, Output, QueryOptions, TableBinding};

mod cache;
pub use cache::ConnectionCache;

mod cancel;
pub use cancel::CancelToken;

pub mod db;
pub use db::Db;

pub use sprig_core::{
    bail, driver, err,
    ident::{self, Direction},
    record::{Record, Table},
    schema::{self, FieldDef, Schema},
    stmt::{self, Statement, Value},
    validate::{self, ErrorCode, FieldError},
    Error, Result,
};

pub use sprig_sql::Flavor;

#[cfg(feature = "mysql")]
pub use sprig_driver_mysql::MySQL;

#[cfg(feature = "postgresql")]
pub use sprig_driver_postgresql::PostgreSQL;

#[cfg(feature = "sqlite")]
pub use sprig_driver_sqlite::Sqlite;

pub mod driver;
pub use driver::Connection;

mod error;
pub use error::{Error, IntoError};

pub mod ident;
pub use ident::{Direction, Ident};

pub mod record;
pub use record::{Record, Table};

pub mod schema;
pub use schema::Schema;

pub mod stmt;

pub mod validate;

pub type Result<T, E = Error> = core::result::Result<T, E>;

use super::Db;
use crate::{Error, Result};

use sprig_core::driver::Connection;
use url::Url;

impl Db {
    /// Opens a connection from a URL and wraps it in a handle.
    ///
    /// Supported schemes are `sqlite` (`sqlite::memory:`,
    /// `sqlite:/path/to.db`), `postgresql` and `mysql`; each needs the
    /// matching crate feature.
    pub fn connect(url: &str) -> Result<Db> {
        Ok(Db::from_boxed(connection(url)?))
    }
}

/// Opens the driver connection named by `url` without wrapping it, for
/// callers that layer their own [`Connection`] on top.
pub fn connection(url: &str) -> Result<Box<dyn Connection>> {
    let parsed = Url::parse(url).map_err(|err| {
        Error::invalid_connection_url(format!("{err}; url={url}"))
    })?;

    match parsed.scheme() {
        "mysql" => connect_mysql(&parsed),
        "postgresql" | "postgres" => connect_postgresql(&parsed),
        "sqlite" => connect_sqlite(&parsed),
        scheme => Err(Error::invalid_connection_url(format!(
            "unsupported database; scheme={scheme}; url={url}"
        ))),
    }
}

#[cfg(feature = "mysql")]
fn connect_mysql(url: &Url) -> Result<Box<dyn Connection>> {
    let driver = sprig_driver_mysql::MySQL::connect(url.as_str())?;
    Ok(Box::new(driver))
}

#[cfg(not(feature = "mysql"))]
fn connect_mysql(_url: &Url) -> Result<Box<dyn Connection>> {
    Err(Error::unsupported_feature("`mysql` feature not enabled"))
}

#[cfg(feature = "postgresql")]
fn connect_postgresql(url: &Url) -> Result<Box<dyn Connection>> {
    let driver = sprig_driver_postgresql::PostgreSQL::connect(url.as_str())?;
    Ok(Box::new(driver))
}

#[cfg(not(feature = "postgresql"))]
fn connect_postgresql(_url: &Url) -> Result<Box<dyn Connection>> {
    Err(Error::unsupported_feature("`postgresql` feature not enabled"))
}

#[cfg(feature = "sqlite")]
fn connect_sqlite(url: &Url) -> Result<Box<dyn Connection>> {
    let driver = sprig_driver_sqlite::Sqlite::connect(url.as_str())?;
    Ok(Box::new(driver))
}

#[cfg(not(feature = "sqlite"))]
fn connect_sqlite(_url: &Url) -> Result<Box<dyn Connection>> {
    Err(Error::unsupported_feature("`sqlite` feature not enabled"))
}

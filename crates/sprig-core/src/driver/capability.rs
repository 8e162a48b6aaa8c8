use std::fmt;
use std::str::FromStr;

#[derive(Debug)]
pub struct Capability {
    pub backend: Backend,

    /// Oldest server version that understands `INSERT … RETURNING`. `None`
    /// when the backend has no RETURNING clause at all.
    pub returning_since: Option<Version>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Sqlite,
    Postgresql,
    Mysql,
}

/// A `major.minor.patch` server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        backend: Backend::Sqlite,
        returning_since: Some(Version::new(3, 35, 0)),
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        backend: Backend::Postgresql,
        returning_since: Some(Version::new(0, 0, 0)),
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        backend: Backend::Mysql,
        returning_since: None,
    };

    /// Whether a server of `version` accepts RETURNING. An unknown version
    /// only qualifies when every version does.
    pub fn supports_returning(&self, version: Option<Version>) -> bool {
        match (self.returning_since, version) {
            (None, _) => false,
            (Some(since), Some(version)) => version >= since,
            (Some(since), None) => since == Version::new(0, 0, 0),
        }
    }
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Version {
        Version {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for Version {
    type Err = crate::Error;

    /// Parses the leading `major[.minor[.patch]]` of a version string,
    /// ignoring any suffix (`8.0.36-log`, `16.2 (Debian …)`).
    fn from_str(s: &str) -> crate::Result<Version> {
        let numeric: &str = s
            .trim()
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .next()
            .unwrap_or_default();

        let mut parts = numeric.split('.').filter(|part| !part.is_empty());
        let major = parts
            .next()
            .ok_or_else(|| crate::err!("unrecognized server version `{s}`"))?
            .parse()?;
        let minor = parts.next().map(str::parse).transpose()?.unwrap_or(0);
        let patch = parts.next().map(str::parse).transpose()?.unwrap_or(0);

        Ok(Version::new(major, minor, patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

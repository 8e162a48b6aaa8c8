use super::Error;

/// Error when a caller-supplied table name, column name or sort direction
/// fails the identifier allow-list.
///
/// This is never recoverable: SQL construction stops at the first offending
/// name and nothing is sent to the database.
#[derive(Debug)]
pub(super) struct InvalidIdentifier {
    name: Box<str>,
    reason: &'static str,
}

impl std::error::Error for InvalidIdentifier {}

impl core::fmt::Display for InvalidIdentifier {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid identifier `{}`: {}", self.name, self.reason)
    }
}

impl Error {
    /// Creates an invalid identifier error.
    pub fn invalid_identifier(name: impl Into<String>, reason: &'static str) -> Error {
        Error::from(super::ErrorKind::InvalidIdentifier(InvalidIdentifier {
            name: name.into().into(),
            reason,
        }))
    }

    /// Returns `true` if this error is an invalid identifier error.
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self.root().kind(), super::ErrorKind::InvalidIdentifier(_))
    }
}

use super::Error;

/// Error when a schema definition is invalid.
///
/// This occurs when:
/// - Two fields share a name, or a field name is not a valid identifier
/// - An enum field declares no values
/// - A pattern does not compile
/// - Incompatible options are combined (`auto` with `required`)
/// - More than one field is marked as the primary key
///
/// These errors are caught while the schema is built, before it is bound to a
/// table.
#[derive(Debug)]
pub(super) struct InvalidSchema {
    message: Box<str>,
}

impl std::error::Error for InvalidSchema {}

impl core::fmt::Display for InvalidSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSchema(InvalidSchema {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid schema error.
    pub fn is_invalid_schema(&self) -> bool {
        matches!(self.root().kind(), super::ErrorKind::InvalidSchema(_))
    }
}

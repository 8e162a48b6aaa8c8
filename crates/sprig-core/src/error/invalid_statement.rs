use super::Error;

/// Error when a statement is well-formed but refused.
///
/// This occurs when:
/// - An update or delete carries an empty filter
/// - An update tries to change the primary key
/// - A terminal does not apply to the statement (`exists` on an insert)
/// - A statement names a different table than the binding it runs on
#[derive(Debug)]
pub(super) struct InvalidStatement {
    message: Box<str>,
}

impl std::error::Error for InvalidStatement {}

impl core::fmt::Display for InvalidStatement {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid statement: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid statement error.
    pub fn invalid_statement(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidStatement(InvalidStatement {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid statement error.
    pub fn is_invalid_statement(&self) -> bool {
        matches!(self.root().kind(), super::ErrorKind::InvalidStatement(_))
    }
}

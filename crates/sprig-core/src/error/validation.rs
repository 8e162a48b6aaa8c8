use super::Error;
use crate::validate::FieldError;

/// Error raised when a caller escalates an invalid record.
///
/// Validation normally returns field errors as data. This kind exists for
/// the paths that must abort, such as returning early from a transaction
/// closure so the transaction rolls back.
#[derive(Debug)]
pub(super) struct ValidationFailed {
    errors: Vec<FieldError>,
}

impl std::error::Error for ValidationFailed {}

impl core::fmt::Display for ValidationFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("validation failed")?;

        let mut s = ": ";
        for error in &self.errors {
            write!(f, "{s}{} ({})", error.field, error.code)?;
            s = ", ";
        }

        Ok(())
    }
}

impl Error {
    /// Creates a validation error carrying the offending field errors.
    pub fn validation_failed(errors: Vec<FieldError>) -> Error {
        Error::from(super::ErrorKind::Validation(ValidationFailed { errors }))
    }

    /// Returns `true` if this error is an escalated validation failure.
    pub fn is_validation_failed(&self) -> bool {
        matches!(self.root().kind(), super::ErrorKind::Validation(_))
    }

    /// The field errors of an escalated validation failure anywhere in the
    /// context chain.
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        self.chain().find_map(|err| match err.kind() {
            super::ErrorKind::Validation(err) => Some(&err.errors[..]),
            _ => None,
        })
    }
}

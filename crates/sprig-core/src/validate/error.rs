use crate::stmt::Value;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// A single field's validation failure.
///
/// The same shape is produced by local validation and by translating a
/// unique-constraint violation reported by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub code: ErrorCode,
    pub message: String,

    /// The offending input, when there was one.
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Required,
    MinLength,
    MaxLength,
    Pattern,
    Enum,
    Range,
    Format,
    Unique,
    /// Merged in by caller code through `Record::with_error`.
    Custom,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Required => "REQUIRED",
            ErrorCode::MinLength => "MIN_LENGTH",
            ErrorCode::MaxLength => "MAX_LENGTH",
            ErrorCode::Pattern => "PATTERN",
            ErrorCode::Enum => "ENUM",
            ErrorCode::Range => "RANGE",
            ErrorCode::Format => "FORMAT",
            ErrorCode::Unique => "UNIQUE",
            ErrorCode::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl FieldError {
    pub fn new(field: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> FieldError {
        FieldError {
            field: field.into(),
            code,
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> FieldError {
        self.value = Some(value);
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Serializes as `{error, field, value, message}`, the uniform error shape
/// the evaluator sees for both pre-write and at-write failures.
impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FieldError", 4)?;
        state.serialize_field("error", &self.code)?;
        state.serialize_field("field", &self.field)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("message", &self.message)?;
        state.end()
    }
}

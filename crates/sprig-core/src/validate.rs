//! Field validation and type casting.
//!
//! Each field is checked in a fixed order and the first failure wins:
//! presence, cast (`FORMAT`), length or range, pattern, enum membership.
//! Uniqueness is left to the database and translated back into a
//! [`FieldError`] on the write path.

mod cast;
pub use cast::{cast, cast_aggregate};

mod error;
pub use error::{ErrorCode, FieldError};

pub mod format;

use crate::schema::{Field, FieldType, Range, Schema};
use crate::stmt::Value;

use indexmap::IndexMap;

/// Outcome of validating a data map: the cast values plus one error per
/// failing field.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Validated {
    pub data: IndexMap<String, Value>,
    pub errors: IndexMap<String, FieldError>,
}

impl Validated {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates every schema field against `data`. Keys that are not schema
/// fields are dropped.
pub fn validate_fields(schema: &Schema, data: &IndexMap<String, Value>) -> Validated {
    let mut validated = Validated::default();

    for field in schema.fields() {
        match validate_field(field, data.get(&field.name)) {
            Ok(value) => {
                validated.data.insert(field.name.clone(), value);
            }
            Err(error) => {
                if let Some(value) = data.get(&field.name) {
                    validated.data.insert(field.name.clone(), value.clone());
                }
                validated.errors.insert(field.name.clone(), error);
            }
        }
    }

    validated
}

/// Validates only the fields present in `data`, as an update does. Absent
/// fields are neither checked nor reported as missing.
pub fn validate_partial(schema: &Schema, data: &IndexMap<String, Value>) -> Validated {
    let mut validated = Validated::default();

    for field in schema.fields() {
        let Some(value) = data.get(&field.name) else {
            continue;
        };

        match validate_field(field, Some(value)) {
            Ok(value) => {
                validated.data.insert(field.name.clone(), value);
            }
            Err(error) => {
                validated.data.insert(field.name.clone(), value.clone());
                validated.errors.insert(field.name.clone(), error);
            }
        }
    }

    validated
}

/// Validates a single value against its field, returning the cast value.
pub fn validate_field(field: &Field, value: Option<&Value>) -> Result<Value, FieldError> {
    let Some(raw) = value.filter(|value| !is_blank(value)) else {
        if field.is_required() {
            return Err(FieldError::new(
                &field.name,
                ErrorCode::Required,
                format!("{} is required", field.title()),
            ));
        }

        return Ok(match (field.ty, value) {
            (FieldType::String | FieldType::Text, Some(value @ Value::String(_))) => value.clone(),
            _ => Value::Null,
        });
    };

    let value = cast(field.ty, raw).ok_or_else(|| {
        FieldError::new(
            &field.name,
            ErrorCode::Format,
            format!("{} is not a valid {}", field.title(), field.ty),
        )
        .with_value(raw.clone())
    })?;

    check_bounds(field, &value).map_err(|err| err.with_value(raw.clone()))?;

    if let (Some(pattern), Some(s)) = (&field.constraints.pattern, value.as_str()) {
        if !s.is_empty() && !pattern.is_match(s) {
            return Err(FieldError::new(
                &field.name,
                ErrorCode::Pattern,
                format!("{} has an invalid format", field.title()),
            )
            .with_value(raw.clone()));
        }
    }

    let allowed = &field.constraints.enum_values;
    if !allowed.is_empty() {
        let member = value
            .as_str()
            .is_some_and(|s| allowed.iter().any(|allowed| allowed == s));

        if !member {
            return Err(FieldError::new(
                &field.name,
                ErrorCode::Enum,
                format!("{} must be one of: {}", field.title(), allowed.join(", ")),
            )
            .with_value(raw.clone()));
        }
    }

    Ok(value)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn check_bounds(field: &Field, value: &Value) -> Result<(), FieldError> {
    let constraints = &field.constraints;

    if let Some(s) = value.as_str() {
        let len = s.chars().count();

        if let Some(min) = constraints.min_length {
            if len < min {
                return Err(FieldError::new(
                    &field.name,
                    ErrorCode::MinLength,
                    format!("{} must be at least {min} characters", field.title()),
                ));
            }
        }

        if let Some(max) = constraints.max_length {
            if len > max {
                return Err(FieldError::new(
                    &field.name,
                    ErrorCode::MaxLength,
                    format!("{} must be at most {max} characters", field.title()),
                ));
            }
        }
    }

    let range_error = |bound: &dyn std::fmt::Display, lower: bool| {
        let relation = if lower { "at least" } else { "at most" };
        FieldError::new(
            &field.name,
            ErrorCode::Range,
            format!("{} must be {relation} {bound}", field.title()),
        )
    };

    match (&constraints.range, value) {
        (Some(Range::Int { min, max }), Value::I64(v)) => {
            if let Some(min) = min.filter(|min| v < min) {
                return Err(range_error(&min, true));
            }
            if let Some(max) = max.filter(|max| v > max) {
                return Err(range_error(&max, false));
            }
        }
        (Some(Range::Float { min, max }), Value::F64(v)) => {
            if let Some(min) = min.filter(|min| v < min) {
                return Err(range_error(&min, true));
            }
            if let Some(max) = max.filter(|max| v > max) {
                return Err(range_error(&max, false));
            }
        }
        _ => {}
    }

    Ok(())
}

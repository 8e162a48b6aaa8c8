use crate::{Error, Result};

use std::fmt;

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Int,
    BigInt,
    Float,
    Bool,
    String,
    Text,
    Email,
    Url,
    Phone,
    Slug,
    Enum,
    /// Integer amount in minor currency units.
    Money,
    DateTime,
    Date,
    Time,
    Uuid,
    Ulid,
    Json,
}

impl FieldType {
    /// Parses a type name, case-insensitively. `id` is an alias for `ulid`.
    pub fn parse(name: &str) -> Result<FieldType> {
        use FieldType::*;

        Ok(match name.to_ascii_lowercase().as_str() {
            "int" | "integer" => Int,
            "bigint" => BigInt,
            "float" | "number" | "real" | "double" => Float,
            "bool" | "boolean" => Bool,
            "string" => String,
            "text" => Text,
            "email" => Email,
            "url" => Url,
            "phone" => Phone,
            "slug" => Slug,
            "enum" => Enum,
            "money" => Money,
            "datetime" | "timestamp" => DateTime,
            "date" => Date,
            "time" => Time,
            "uuid" => Uuid,
            "ulid" | "id" => Ulid,
            "json" => Json,
            _ => {
                return Err(Error::invalid_schema(format!(
                    "unknown field type `{name}`"
                )))
            }
        })
    }

    pub fn name(self) -> &'static str {
        use FieldType::*;

        match self {
            Int => "int",
            BigInt => "bigint",
            Float => "float",
            Bool => "bool",
            String => "string",
            Text => "text",
            Email => "email",
            Url => "url",
            Phone => "phone",
            Slug => "slug",
            Enum => "enum",
            Money => "money",
            DateTime => "datetime",
            Date => "date",
            Time => "time",
            Uuid => "uuid",
            Ulid => "ulid",
            Json => "json",
        }
    }

    /// Types whose values are strings in storage.
    pub fn is_string_like(self) -> bool {
        use FieldType::*;
        matches!(
            self,
            String | Text | Email | Url | Phone | Slug | Enum | Uuid | Ulid
        )
    }

    /// Types for which `min`/`max` bound the length rather than the value.
    pub fn has_length(self) -> bool {
        use FieldType::*;
        matches!(self, String | Text | Email | Url | Phone | Slug)
    }

    pub fn is_integer(self) -> bool {
        matches!(self, FieldType::Int | FieldType::BigInt | FieldType::Money)
    }

    pub fn is_float(self) -> bool {
        matches!(self, FieldType::Float)
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, FieldType::DateTime | FieldType::Date | FieldType::Time)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

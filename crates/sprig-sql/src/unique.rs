//! Recognizing unique-constraint violations in driver error messages.
//!
//! Uniqueness is the one constraint the validator cannot check in memory.
//! The write path lets the database enforce it and uses [`unique_violation`]
//! to turn the failure back into a field-level `UNIQUE` error.

use crate::Flavor;

use regex::Regex;
use std::sync::LazyLock;

/// A recognized unique-constraint failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueViolation {
    /// The offending column, when the message names it.
    pub column: Option<String>,
}

static SQLITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"UNIQUE constraint failed: (?:\w+\.)?(\w+)").expect("valid regex")
});

static POSTGRES_DETAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Key \(([^)]+)\)=").expect("valid regex"));

static POSTGRES_CONSTRAINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"unique constraint "([^"]+)""#).expect("valid regex"));

static MYSQL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Duplicate entry .* for key '([^']+)'").expect("valid regex"));

/// Parses a driver error `message` raised while writing to `table`. Returns
/// `None` when the message is not a unique violation.
pub fn unique_violation(flavor: Flavor, table: &str, message: &str) -> Option<UniqueViolation> {
    let column = match flavor {
        Flavor::Sqlite => {
            if !message.contains("UNIQUE constraint failed") {
                return None;
            }
            capture(&SQLITE, message)
        }
        Flavor::Postgresql => {
            if !message.contains("duplicate key value violates unique constraint")
                && !message.contains("23505")
            {
                return None;
            }

            capture(&POSTGRES_DETAIL, message)
                .map(|columns| first_column(&columns))
                .or_else(|| {
                    capture(&POSTGRES_CONSTRAINT, message)
                        .and_then(|constraint| column_from_constraint(table, &constraint))
                })
        }
        Flavor::Mysql => {
            if !message.contains("Duplicate entry") && !message.contains("1062") {
                return None;
            }

            // MySQL 8 qualifies the key with the table name.
            capture(&MYSQL, message).map(|key| match key.rsplit_once('.') {
                Some((_, column)) => column.to_string(),
                None => key,
            })
        }
    };

    Some(UniqueViolation { column })
}

fn capture(regex: &Regex, message: &str) -> Option<String> {
    regex
        .captures(message)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Composite keys report every column; the error lands on the first.
fn first_column(columns: &str) -> String {
    columns
        .split(',')
        .next()
        .unwrap_or(columns)
        .trim()
        .trim_matches('"')
        .to_string()
}

/// PostgreSQL names inline unique constraints `<table>_<column>_key`.
fn column_from_constraint(table: &str, constraint: &str) -> Option<String> {
    constraint
        .strip_prefix(table)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix("_key"))
        .filter(|column| !column.is_empty())
        .map(str::to_string)
}

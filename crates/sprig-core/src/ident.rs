//! The identifier allow-list.
//!
//! Every table name, column name and sort direction that ends up in SQL text
//! passes through this module first. Names are accepted only if they match
//! `[A-Za-z_][A-Za-z0-9_]{0,63}`; anything else aborts SQL construction with
//! an [`Error::invalid_identifier`]. Nothing is ever escaped and retried.

use crate::{Error, Result};

use std::fmt;

/// Longest accepted identifier, in bytes.
pub const MAX_LEN: usize = 64;

/// Returns `true` if `name` may be embedded in SQL text as a table or column
/// name.
pub fn is_valid_identifier(name: &str) -> bool {
    check(name).is_ok()
}

/// Validates `name`, returning the allow-listed identifier.
pub fn validate_identifier(name: &str) -> Result<Ident> {
    Ident::new(name)
}

fn check(name: &str) -> Result<(), &'static str> {
    let mut bytes = name.bytes();

    match bytes.next() {
        None => return Err("identifier is empty"),
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        Some(_) => return Err("must start with a letter or underscore"),
    }

    if !bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err("may only contain letters, digits and underscores");
    }

    if name.len() > MAX_LEN {
        return Err("longer than 64 characters");
    }

    Ok(())
}

/// A name that passed the identifier allow-list.
///
/// The only way to obtain an `Ident` is through validation, so code that
/// holds one can embed it in SQL (after dialect quoting) without further
/// checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(Box<str>);

impl Ident {
    pub fn new(name: &str) -> Result<Ident> {
        match check(name) {
            Ok(()) => Ok(Ident(name.into())),
            Err(reason) => Err(Error::invalid_identifier(name, reason)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier collides with an SQL keyword. Such
    /// names are still usable; they are always emitted quoted.
    pub fn is_reserved(&self) -> bool {
        is_reserved_word(&self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Ident {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Ident {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Sort direction of an `ORDER BY` term.
///
/// Directions come from a fixed set and are never copied from caller text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Parses `asc` or `desc` in any letter case.
    pub fn parse(direction: &str) -> Result<Direction> {
        if direction.eq_ignore_ascii_case("asc") {
            Ok(Direction::Asc)
        } else if direction.eq_ignore_ascii_case("desc") {
            Ok(Direction::Desc)
        } else {
            Err(Error::invalid_identifier(
                direction,
                "sort direction must be ASC or DESC",
            ))
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// SQL keywords that commonly show up as field names. Kept sorted for binary
/// search.
const RESERVED_WORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "CURRENT", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP",
    "ELSE", "END", "EXISTS", "FOREIGN", "FROM", "FULL", "GROUP", "HAVING", "IN", "INDEX", "INNER",
    "INSERT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "LIMIT", "NOT", "NULL", "OFFSET", "ON",
    "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "ROW", "SELECT", "SET", "TABLE",
    "THEN", "TO", "UNION", "UNIQUE", "UPDATE", "USER", "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

/// Returns `true` if `name` is an SQL keyword, ignoring case.
pub fn is_reserved_word(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    RESERVED_WORDS.binary_search(&upper.as_str()).is_ok()
}

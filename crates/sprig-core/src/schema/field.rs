use super::{FieldType, Metadata};
use crate::stmt::Value;

use regex::Regex;
use std::fmt;

/// A checked field definition.
///
/// Fields are only produced by [`Schema::builder`](super::Schema::builder),
/// which guarantees that enum fields have values and patterns compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub constraints: Constraints,
    pub nullable: bool,
    pub auto: bool,
    pub primary_key: bool,
    pub read_only: bool,
    pub default: Option<Value>,
    pub metadata: Metadata,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Constraints {
    pub required: bool,
    pub unique: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub range: Option<Range>,
    pub pattern: Option<Pattern>,
    pub enum_values: Vec<String>,
}

/// Numeric bounds. A field carries an integer range or a float range, never
/// both.
#[derive(Debug, Clone, PartialEq)]
pub enum Range {
    Int { min: Option<i64>, max: Option<i64> },
    Float { min: Option<f64>, max: Option<f64> },
}

/// A compiled, fully-anchored pattern.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Field {
    pub fn is_required(&self) -> bool {
        self.constraints.required
    }

    pub fn is_unique(&self) -> bool {
        self.constraints.unique || self.primary_key
    }

    pub fn is_hidden(&self) -> bool {
        self.metadata.is_hidden()
    }

    pub fn enum_values(&self) -> &[String] {
        &self.constraints.enum_values
    }

    /// Human-readable label: metadata `title`, else the name title-cased.
    pub fn title(&self) -> String {
        use heck::ToTitleCase;

        match self.metadata.title() {
            Some(title) => title.to_string(),
            None => self.name.to_title_case(),
        }
    }
}

impl Pattern {
    pub(super) fn compile(source: &str) -> Result<Pattern, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Pattern {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whole-string match.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

use super::Metadata;
use crate::stmt::Value;

/// An unchecked field declaration, as the host describes it.
///
/// `min` and `max` are interpreted by type when the schema is built: as
/// length bounds for textual types and as value bounds for numeric ones.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: String,
    pub values: Vec<String>,
    pub required: Option<bool>,
    pub nullable: bool,
    pub unique: bool,
    pub auto: bool,
    pub primary_key: bool,
    pub read_only: bool,
    pub min: Option<Number>,
    pub max: Option<Number>,
    pub pattern: Option<String>,
    pub default: Option<Value>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(super) fn as_i64(self) -> Option<i64> {
        match self {
            Number::Int(v) => Some(v),
            Number::Float(v) if v.fract() == 0.0 => Some(v as i64),
            Number::Float(_) => None,
        }
    }

    pub(super) fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Int(value.into())
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Number::Int(value as i64)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> FieldDef {
        FieldDef {
            name: name.into(),
            ty: ty.into(),
            values: vec![],
            required: None,
            nullable: false,
            unique: false,
            auto: false,
            primary_key: false,
            read_only: false,
            min: None,
            max: None,
            pattern: None,
            default: None,
            metadata: Metadata::default(),
        }
    }

    /// An `enum` field with the given allowed values.
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> FieldDef
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut def = FieldDef::new(name, "enum");
        def.values = values.into_iter().map(Into::into).collect();
        def
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    /// Nullable and not required.
    pub fn optional(mut self) -> Self {
        self.nullable = true;
        self.required = Some(false);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn min(mut self, min: impl Into<Number>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<Number>) -> Self {
        self.max = Some(max.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn title(self, title: &str) -> Self {
        self.meta("title", title)
    }

    pub fn placeholder(self, placeholder: &str) -> Self {
        self.meta("placeholder", placeholder)
    }

    pub fn hidden(self) -> Self {
        self.meta("hidden", true)
    }
}

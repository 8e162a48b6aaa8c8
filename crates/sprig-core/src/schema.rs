//! Declarative field schemas.
//!
//! A [`Schema`] is built once from [`FieldDef`]s and never changes afterwards.
//! It is shared behind an `Arc` by every [`Record`](crate::Record) and table
//! binding created from it.

mod builder;
pub use builder::Builder;

mod def;
pub use def::{FieldDef, Number};

mod field;
pub use field::{Constraints, Field, Pattern, Range};

mod identity;
pub use identity::{IdStrategy, Identity};

mod metadata;
pub use metadata::Metadata;

mod ty;
pub use ty::FieldType;

mod verify;

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    fields: IndexMap<String, Field>,
    identity: Option<Identity>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> Builder {
        Builder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &Field> {
        self.fields.values()
    }

    /// Fields a form should render: everything except auto-generated and
    /// hidden fields.
    pub fn visible_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .values()
            .filter(|field| !field.auto && !field.is_hidden())
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn primary_key(&self) -> Option<&Field> {
        self.identity
            .as_ref()
            .and_then(|identity| self.fields.get(&identity.field))
    }

    /// Label for a field; falls back to the title-cased name for unknown
    /// fields.
    pub fn title(&self, field: &str) -> String {
        match self.fields.get(field) {
            Some(field) => field.title(),
            None => {
                use heck::ToTitleCase;
                field.to_title_case()
            }
        }
    }

    pub fn placeholder(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|field| field.metadata.placeholder())
    }

    pub fn meta(&self, field: &str, key: &str) -> Option<&serde_json::Value> {
        self.fields
            .get(field)
            .and_then(|field| field.metadata.get(key))
    }

    pub fn enum_values(&self, field: &str) -> &[String] {
        self.fields
            .get(field)
            .map(Field::enum_values)
            .unwrap_or(&[])
    }
}

use super::{verify, FieldDef, Schema};
use crate::Result;

/// Collects field declarations; [`Builder::build`] checks them and produces
/// the immutable [`Schema`].
#[derive(Debug, Clone)]
pub struct Builder {
    name: String,
    fields: Vec<FieldDef>,
}

impl Builder {
    pub(super) fn new(name: impl Into<String>) -> Builder {
        Builder {
            name: name.into(),
            fields: vec![],
        }
    }

    pub fn field(mut self, def: FieldDef) -> Builder {
        self.fields.push(def);
        self
    }

    pub fn fields(mut self, defs: impl IntoIterator<Item = FieldDef>) -> Builder {
        self.fields.extend(defs);
        self
    }

    pub fn build(self) -> Result<Schema> {
        verify::schema(self.name, self.fields)
    }
}

use crate::schema::Schema;
use crate::stmt::Value;
use crate::validate::{self, ErrorCode, FieldError};
use crate::{Error, Result};

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::ops::Index;
use std::sync::Arc;

/// Schema-bound data plus per-field errors.
///
/// Records are immutable: [`Record::validate`], [`Record::with_error`] and
/// [`Record::update`] all return a new record. Data is read with
/// [`Record::get`] or indexing; everything else is a method, so a field
/// literally named `errors` never shadows [`Record::errors`].
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    data: IndexMap<String, Value>,
    errors: IndexMap<String, FieldError>,
    validated: bool,
}

/// Rows returned by a multi-row read, each a [`Record`] carrying the schema.
#[derive(Debug, Clone)]
pub struct Table {
    schema: Arc<Schema>,
    rows: Vec<Record>,
}

static NULL: Value = Value::Null;

impl Record {
    /// Builds a record from input data. Unknown keys are dropped; known keys
    /// are cast to their field type where possible. Nothing is validated
    /// yet.
    pub fn new<K, V>(schema: Arc<Schema>, data: impl IntoIterator<Item = (K, V)>) -> Record
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut input: IndexMap<String, Value> = data
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        let mut cast = IndexMap::with_capacity(schema.fields().len());
        for field in schema.fields() {
            if let Some(value) = input.swap_remove(&field.name) {
                let value = match &value {
                    Value::Null => value,
                    raw => validate::cast(field.ty, raw).unwrap_or(value),
                };
                cast.insert(field.name.clone(), value);
            }
        }

        Record {
            schema,
            data: cast,
            errors: IndexMap::new(),
            validated: false,
        }
    }

    /// Builds a record from a database row. Stored values are trusted and
    /// the record counts as validated.
    pub fn from_row(schema: Arc<Schema>, columns: &[String], values: Vec<Value>) -> Record {
        let mut data = IndexMap::with_capacity(columns.len());

        for (column, value) in columns.iter().zip(values) {
            let Some(field) = schema.field(column) else {
                continue;
            };

            let value = match &value {
                Value::Null => value,
                raw => validate::cast(field.ty, raw).unwrap_or(value),
            };
            data.insert(column.clone(), value);
        }

        Record {
            schema,
            data,
            errors: IndexMap::new(),
            validated: true,
        }
    }

    /// Wraps the outcome of [`validate::validate_fields`] or
    /// [`validate::validate_partial`].
    pub fn from_validated(schema: Arc<Schema>, validated: validate::Validated) -> Record {
        Record {
            schema,
            data: validated.data,
            errors: validated.errors,
            validated: true,
        }
    }

    /// Returns a new record with every field validated. Caller-merged
    /// `CUSTOM` errors are kept.
    pub fn validate(&self) -> Record {
        let validated = validate::validate_fields(&self.schema, &self.data);
        let mut record = Record::from_validated(self.schema.clone(), validated);

        for (field, error) in &self.errors {
            if error.code == ErrorCode::Custom && !record.errors.contains_key(field) {
                record.errors.insert(field.clone(), error.clone());
            }
        }

        record
    }

    /// `true` once validated with no errors. A record that was never
    /// validated is not valid.
    pub fn is_valid(&self) -> bool {
        self.validated && self.errors.is_empty()
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Error message for `field`, if it failed.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(|error| error.message.as_str())
    }

    pub fn error_code(&self, field: &str) -> Option<ErrorCode> {
        self.errors.get(field).map(|error| error.code)
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn errors(&self) -> &IndexMap<String, FieldError> {
        &self.errors
    }

    /// All errors, sorted by field name.
    pub fn error_list(&self) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = self.errors.values().cloned().collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        errors
    }

    /// Returns a new record with a caller-supplied error on `field`, coded
    /// `CUSTOM`. Used for cross-field rules a schema cannot express.
    pub fn with_error(&self, field: &str, message: impl Into<String>) -> Record {
        self.with_error_code(field, ErrorCode::Custom, message)
    }

    pub fn with_error_code(
        &self,
        field: &str,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Record {
        let mut error = FieldError::new(field, code, message);
        error.value = self.data.get(field).cloned();

        let mut record = self.clone();
        record.errors.insert(field.to_string(), error);
        record
    }

    /// Returns a new record with `data` merged in. Unknown keys are dropped.
    /// A record that had been validated is validated again.
    pub fn update<K, V>(&self, data: impl IntoIterator<Item = (K, V)>) -> Record
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let merged = self
            .data
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .chain(data.into_iter().map(|(key, value)| (key.into(), value.into())));

        let record = Record::new(self.schema.clone(), merged);

        if self.validated {
            record.validate()
        } else {
            record
        }
    }

    /// Converts an invalid record into an error, so it can abort a
    /// transaction with `?`.
    pub fn ensure_valid(self) -> Result<Record> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(Error::validation_failed(self.error_list()))
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Plain map view of the data.
    pub fn data(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    pub fn into_data(self) -> IndexMap<String, Value> {
        self.data
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Fields present in the data, in schema order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Value of the primary key, if the schema has one and it is set.
    pub fn id(&self) -> Option<&Value> {
        self.schema
            .identity()
            .and_then(|identity| self.data.get(&identity.field))
            .filter(|value| !value.is_null())
    }

    pub fn title(&self, field: &str) -> String {
        self.schema.title(field)
    }

    pub fn placeholder(&self, field: &str) -> Option<&str> {
        self.schema.placeholder(field)
    }

    pub fn meta(&self, field: &str, key: &str) -> Option<&serde_json::Value> {
        self.schema.meta(field, key)
    }

    pub fn enum_values(&self, field: &str) -> &[String] {
        self.schema.enum_values(field)
    }
}

impl Index<&str> for Record {
    type Output = Value;

    /// Missing fields read as `Null`.
    fn index(&self, field: &str) -> &Value {
        self.data.get(field).unwrap_or(&NULL)
    }
}

/// Serializes as the plain data map.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.data.iter())
    }
}

impl Table {
    pub fn new(schema: Arc<Schema>, rows: Vec<Record>) -> Table {
        Table { schema, rows }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.rows.get(index)
    }

    pub fn first(&self) -> Option<&Record> {
        self.rows.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    /// Values of one column across all rows.
    pub fn column(&self, field: &str) -> Vec<Value> {
        self.rows.iter().map(|row| row[field].clone()).collect()
    }
}

impl Index<usize> for Table {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.rows[index]
    }
}

impl IntoIterator for Table {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

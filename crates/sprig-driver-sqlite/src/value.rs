use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};
use sprig_core::stmt::Value as CoreValue;

pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S%.f";

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Reads column `index` of `row`. SQLite has no declared types to go by;
    /// the schema casts the raw value afterwards.
    pub fn from_sql(row: &Row<'_>, index: usize) -> rusqlite::Result<Self> {
        let value = match row.get_ref(index)? {
            ValueRef::Null => CoreValue::Null,
            ValueRef::Integer(value) => CoreValue::I64(value),
            ValueRef::Real(value) => CoreValue::F64(value),
            ValueRef::Text(value) | ValueRef::Blob(value) => {
                CoreValue::String(String::from_utf8_lossy(value).into_owned())
            }
        };

        Ok(Value(value))
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use CoreValue::*;

        Ok(match &self.0 {
            Null => ToSqlOutput::Owned(SqlValue::Null),
            Bool(v) => ToSqlOutput::Owned(SqlValue::Integer(*v as i64)),
            I64(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            F64(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            String(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Date(v) => ToSqlOutput::Owned(SqlValue::Text(v.format(DATE_FORMAT).to_string())),
            Time(v) => ToSqlOutput::Owned(SqlValue::Text(v.format(TIME_FORMAT).to_string())),
            DateTime(v) => {
                ToSqlOutput::Owned(SqlValue::Text(v.format(DATETIME_FORMAT).to_string()))
            }
            Json(v) => ToSqlOutput::Owned(SqlValue::Text(v.to_string())),
            List(_) => {
                return Err(rusqlite::Error::ToSqlConversionFailure(
                    "a list cannot be bound as one SQLite parameter".into(),
                ))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn datetimes_bind_as_sortable_text() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_milli_opt(7, 5, 0, 250)
            .unwrap();

        let binding = Value::from(CoreValue::DateTime(at));
        let output = binding.to_sql().unwrap();
        assert_eq!(
            output,
            ToSqlOutput::Owned(SqlValue::Text("2024-03-09 07:05:00.250".into()))
        );
    }

    #[test]
    fn lists_are_refused() {
        let value = Value::from(CoreValue::List(vec![CoreValue::I64(1)]));
        assert!(value.to_sql().is_err());
    }
}

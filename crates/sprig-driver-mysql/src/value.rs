use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use mysql_async::consts::ColumnType;
use mysql_async::prelude::ToValue;
use mysql_async::{Column, Value as SqlValue};
use sprig_core::stmt::Value as CoreValue;

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

    /// Converts a value read with the binary protocol. Integers, decimals and
    /// JSON come back loosely typed; the schema casts them afterwards.
    pub fn from_sql(value: SqlValue, column: &Column) -> Self {
        let value = match value {
            SqlValue::NULL => CoreValue::Null,
            SqlValue::Int(v) => CoreValue::I64(v),
            SqlValue::UInt(v) => match i64::try_from(v) {
                Ok(v) => CoreValue::I64(v),
                Err(_) => CoreValue::String(v.to_string()),
            },
            SqlValue::Float(v) => CoreValue::F64(v as f64),
            SqlValue::Double(v) => CoreValue::F64(v),
            SqlValue::Bytes(bytes) => CoreValue::String(String::from_utf8_lossy(&bytes).into_owned()),
            SqlValue::Date(year, month, day, hour, minute, second, micros) => {
                let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
                match column.column_type() {
                    ColumnType::MYSQL_TYPE_DATE => date.map(CoreValue::Date).into(),
                    _ => date
                        .and_then(|date| {
                            date.and_hms_micro_opt(hour as u32, minute as u32, second as u32, micros)
                        })
                        .map(CoreValue::DateTime)
                        .into(),
                }
            }
            SqlValue::Time(_, days, hours, minutes, seconds, micros) => NaiveTime::from_hms_micro_opt(
                (days * 24 + hours as u32) % 24,
                minutes as u32,
                seconds as u32,
                micros,
            )
            .map(CoreValue::Time)
            .into(),
        };

        Value(value)
    }
}

impl ToValue for Value {
    fn to_value(&self) -> SqlValue {
        match &self.0 {
            CoreValue::Null => SqlValue::NULL,
            CoreValue::Bool(v) => v.to_value(),
            CoreValue::I64(v) => v.to_value(),
            CoreValue::F64(v) => v.to_value(),
            CoreValue::String(v) => v.to_value(),
            CoreValue::Date(v) => {
                SqlValue::Date(v.year() as u16, v.month() as u8, v.day() as u8, 0, 0, 0, 0)
            }
            CoreValue::Time(v) => SqlValue::Time(
                false,
                0,
                v.hour() as u8,
                v.minute() as u8,
                v.second() as u8,
                v.nanosecond() / 1_000,
            ),
            CoreValue::DateTime(v) => SqlValue::Date(
                v.year() as u16,
                v.month() as u8,
                v.day() as u8,
                v.hour() as u8,
                v.minute() as u8,
                v.second() as u8,
                v.nanosecond() / 1_000,
            ),
            CoreValue::Json(v) => v.to_string().to_value(),
            // Refused before binding; see `MySQL::bind`.
            CoreValue::List(_) => SqlValue::NULL,
        }
    }
}

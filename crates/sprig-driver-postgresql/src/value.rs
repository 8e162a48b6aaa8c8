use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres::types::{private::BytesMut, to_sql_checked, IsNull, ToSql, Type};
use postgres::{Column, Row};
use sprig_core::schema::FieldType;
use sprig_core::stmt::Value as CoreValue;
use sprig_core::validate;

type BoxError = Box<dyn std::error::Error + Sync + Send>;

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    /// Reads column `index` of `row` by its PostgreSQL type.
    pub fn from_row(row: &Row, index: usize, column: &Column) -> Result<CoreValue, postgres::Error> {
        let ty = column.type_();

        Ok(if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(index)?.map(CoreValue::Bool).into()
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(index)?
                .map(|v| CoreValue::I64(v as i64))
                .into()
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(index)?
                .map(|v| CoreValue::I64(v as i64))
                .into()
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(index)?.map(CoreValue::I64).into()
        } else if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(index)?
                .map(|v| CoreValue::F64(v as f64))
                .into()
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(index)?.map(CoreValue::F64).into()
        } else if *ty == Type::TIMESTAMP {
            row.try_get::<_, Option<NaiveDateTime>>(index)?
                .map(CoreValue::DateTime)
                .into()
        } else if *ty == Type::TIMESTAMPTZ {
            row.try_get::<_, Option<DateTime<Utc>>>(index)?
                .map(|v| CoreValue::DateTime(v.naive_utc()))
                .into()
        } else if *ty == Type::DATE {
            row.try_get::<_, Option<NaiveDate>>(index)?.map(CoreValue::Date).into()
        } else if *ty == Type::TIME {
            row.try_get::<_, Option<NaiveTime>>(index)?.map(CoreValue::Time).into()
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            row.try_get::<_, Option<serde_json::Value>>(index)?
                .map(CoreValue::Json)
                .into()
        } else {
            // TEXT, VARCHAR, NAME and anything else with a text representation.
            row.try_get::<_, Option<String>>(index)?.map(CoreValue::String).into()
        })
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match &self.0 {
            CoreValue::Null => Ok(IsNull::Yes),
            CoreValue::Bool(v) => match *ty {
                Type::BOOL => v.to_sql(ty, out),
                _ => integer(*v as i64, ty, out),
            },
            CoreValue::I64(v) => integer(*v, ty, out),
            CoreValue::F64(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => v.to_sql(ty, out),
                _ => text(&v.to_string(), ty, out),
            },
            CoreValue::String(v) => text(v, ty, out),
            CoreValue::Date(v) => v.to_sql(ty, out),
            CoreValue::Time(v) => v.to_sql(ty, out),
            CoreValue::DateTime(v) => match *ty {
                Type::TIMESTAMPTZ => DateTime::<Utc>::from_naive_utc_and_offset(*v, Utc).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            CoreValue::Json(v) => match *ty {
                Type::JSON | Type::JSONB => v.to_sql(ty, out),
                _ => v.to_string().to_sql(ty, out),
            },
            CoreValue::List(_) => Err("a list cannot be bound as one PostgreSQL parameter".into()),
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn integer(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        Type::BOOL => (v != 0).to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR => v.to_string().to_sql(ty, out),
        _ => v.to_sql(ty, out),
    }
}

/// Strings reach typed columns through filters; they are cast to the
/// column's type first.
fn text(v: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    let target = match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 => FieldType::BigInt,
        Type::FLOAT4 | Type::FLOAT8 => FieldType::Float,
        Type::BOOL => FieldType::Bool,
        Type::TIMESTAMP | Type::TIMESTAMPTZ => FieldType::DateTime,
        Type::DATE => FieldType::Date,
        Type::TIME => FieldType::Time,
        Type::JSON | Type::JSONB => FieldType::Json,
        _ => return v.to_sql(ty, out),
    };

    let string = CoreValue::String(v.to_string());
    let Some(cast) = validate::cast(target, &string) else {
        return Err(format!("`{v}` is not a valid {ty}").into());
    };

    Value(cast).to_sql(ty, out)
}

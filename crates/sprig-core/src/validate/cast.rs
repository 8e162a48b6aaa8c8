use super::format;
use crate::schema::FieldType;
use crate::stmt::Value;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Casts a raw value to `ty`. Returns `None` when the value cannot represent
/// that type; the validator reports this as a `FORMAT` error.
///
/// `Null` is never passed in; presence is checked before casting.
pub fn cast(ty: FieldType, value: &Value) -> Option<Value> {
    use FieldType::*;

    match ty {
        Int | BigInt => cast_int(value).map(Value::I64),
        Money => cast_money(value).map(Value::I64),
        Float => cast_float(value).map(Value::F64),
        Bool => cast_bool(value).map(Value::Bool),
        String | Text => match value {
            Value::String(_) => Some(value.clone()),
            Value::I64(_) | Value::F64(_) | Value::Bool(_) => Some(Value::String(value.to_string())),
            _ => None,
        },
        Email => checked_str(value, format::is_email),
        Url => checked_str(value, format::is_url),
        Phone => checked_str(value, format::is_phone),
        Slug => checked_str(value, format::is_slug),
        Enum => value.as_str().map(|s| Value::String(s.to_string())),
        Uuid => checked_str(value, format::is_uuid).map(|v| match v {
            Value::String(s) => Value::String(s.to_ascii_lowercase()),
            v => v,
        }),
        Ulid => checked_str(value, format::is_ulid).map(|v| match v {
            Value::String(s) => Value::String(s.to_ascii_uppercase()),
            v => v,
        }),
        DateTime => cast_datetime(value).map(Value::DateTime),
        Date => cast_date(value).map(Value::Date),
        Time => cast_time(value).map(Value::Time),
        Json => Some(match value {
            Value::Json(_) => value.clone(),
            Value::String(s) => serde_json::from_str(s)
                .map(Value::Json)
                .unwrap_or_else(|_| Value::Json(serde_json::Value::String(s.clone()))),
            other => Value::Json(other.to_json()),
        }),
    }
}

/// Reads back the result of `SUM`/`MIN`/`MAX` over a column of type `ty`.
///
/// Integer-stored columns (`int`, `bigint`, `money`) aggregate to integers,
/// but drivers may widen them to a float or a decimal string. Those are
/// converted as they are, without rescaling: a money sum is already in minor
/// units.
pub fn cast_aggregate(ty: FieldType, value: &Value) -> Option<Value> {
    use FieldType::*;

    match ty {
        Int | BigInt | Money => integral(value).map(Value::I64),
        _ => cast(ty, value),
    }
}

fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            s.parse().ok().or_else(|| {
                // `1234.00` from a DECIMAL column
                let (whole, fraction) = s.split_once('.')?;
                if fraction.bytes().all(|b| b == b'0') {
                    whole.parse().ok()
                } else {
                    None
                }
            })
        }
        _ => cast_int(value),
    }
}

fn checked_str(value: &Value, check: fn(&str) -> bool) -> Option<Value> {
    match value {
        Value::String(s) if s.is_empty() || check(s) => Some(value.clone()),
        _ => None,
    }
}

fn cast_int(value: &Value) -> Option<i64> {
    match value {
        Value::I64(v) => Some(*v),
        Value::F64(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Some(*v as i64),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn cast_float(value: &Value) -> Option<f64> {
    match value {
        Value::I64(v) => Some(*v as f64),
        Value::F64(v) => Some(*v),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn cast_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(v) => Some(*v),
        Value::I64(0) => Some(false),
        Value::I64(1) => Some(true),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Integers are already minor units. Decimal input may carry at most two
/// fractional digits.
fn cast_money(value: &Value) -> Option<i64> {
    match value {
        Value::I64(v) => Some(*v),
        Value::F64(v) => {
            let cents = v * 100.0;
            let rounded = cents.round();
            ((cents - rounded).abs() < 1e-6 && rounded.abs() < i64::MAX as f64)
                .then_some(rounded as i64)
        }
        Value::String(s) => parse_decimal_minor_units(s.trim()),
        _ => None,
    }
}

fn parse_decimal_minor_units(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };

    if whole.is_empty()
        || fraction.len() > 2
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };

    let minor = whole.checked_mul(100)?.checked_add(fraction)?;
    Some(if negative { -minor } else { minor })
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

fn cast_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(v) => Some(*v),
        Value::Date(v) => v.and_hms_opt(0, 0, 0),
        Value::String(s) => {
            let s = s.trim();

            if let Ok(v) = DateTime::parse_from_rfc3339(s) {
                return Some(v.naive_utc());
            }

            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
        }
        _ => None,
    }
}

fn cast_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(v) => Some(*v),
        Value::DateTime(v) => Some(v.date()),
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
        _ => None,
    }
}

fn cast_time(value: &Value) -> Option<NaiveTime> {
    match value {
        Value::Time(v) => Some(*v),
        Value::String(s) => {
            let s = s.trim();
            ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"]
                .iter()
                .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
        }
        _ => None,
    }
}

//! Untyped row decoding for procedures whose column list varies per call site.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use uuid::Uuid;

use crate::assembler;

/// Convert a row to a column-name -> JSON map, keeping column order.
pub fn row_to_json(row: &PgRow) -> Result<assembler::Row, sqlx::Error> {
    let mut map = Map::new();
    for (i, col) in row.columns().iter().enumerate() {
        map.insert(col.name().to_string(), column_value(row, i)?);
    }
    Ok(map)
}

fn column_value(row: &PgRow, i: usize) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(i)?.is_null() {
        return Ok(Value::Null);
    }

    let type_name = row.column(i).type_info().name().to_string();
    let value = match type_name.as_str() {
        "BOOL" => Value::Bool(row.try_get(i)?),
        "INT2" => Value::from(row.try_get::<i16, _>(i)?),
        "INT4" => Value::from(row.try_get::<i32, _>(i)?),
        "INT8" => Value::from(row.try_get::<i64, _>(i)?),
        "FLOAT4" => float(row.try_get::<f32, _>(i)? as f64),
        "FLOAT8" => float(row.try_get::<f64, _>(i)?),
        "NUMERIC" => decimal(row.try_get::<Decimal, _>(i)?),
        "UUID" => Value::String(row.try_get::<Uuid, _>(i)?.to_string()),
        "DATE" => Value::String(row.try_get::<NaiveDate, _>(i)?.to_string()),
        "TIME" => Value::String(row.try_get::<NaiveTime, _>(i)?.to_string()),
        "TIMESTAMP" => json_of(row.try_get::<NaiveDateTime, _>(i)?),
        "TIMESTAMPTZ" => json_of(row.try_get::<DateTime<Utc>, _>(i)?),
        "JSON" | "JSONB" => row.try_get::<Value, _>(i)?,
        "TEXT[]" | "VARCHAR[]" => Value::from(row.try_get::<Vec<String>, _>(i)?),
        "UUID[]" => Value::from(
            row.try_get::<Vec<Uuid>, _>(i)?
                .into_iter()
                .map(|u| u.to_string())
                .collect::<Vec<_>>(),
        ),
        _ => fallback(row, i),
    };
    Ok(value)
}

// Unknown types: try the common decodings in turn, as text last
fn fallback(row: &PgRow, i: usize) -> Value {
    if let Ok(s) = row.try_get::<String, _>(i) {
        Value::String(s)
    } else if let Ok(v) = row.try_get::<i64, _>(i) {
        Value::from(v)
    } else if let Ok(v) = row.try_get::<f64, _>(i) {
        float(v)
    } else if let Ok(v) = row.try_get::<bool, _>(i) {
        Value::Bool(v)
    } else {
        Value::Null
    }
}

fn float(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

// Money stays numeric on the wire; rust_decimal's own serde form is a string
fn decimal(d: Decimal) -> Value {
    d.normalize()
        .to_string()
        .parse::<Number>()
        .map_or_else(|_| Value::String(d.to_string()), Value::Number)
}

fn json_of<T: serde::Serialize>(v: T) -> Value {
    serde_json::to_value(v).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn decimals_render_as_numbers() {
        assert_eq!(decimal(Decimal::from_str("1500.50").unwrap()), serde_json::json!(1500.5));
        assert_eq!(decimal(Decimal::from_str("200000.00").unwrap()), serde_json::json!(200000));
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(float(f64::NAN), Value::Null);
        assert_eq!(float(2.5), serde_json::json!(2.5));
    }
}

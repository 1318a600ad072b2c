//! Schema-less representation of a result row.
//!
//! The copier never knows the table layout in advance. Every row returned by the source query is
//! decoded into an ordered mapping from column name to [`CellValue`], using only the column
//! specifications sent along with the result set. Values are re-encoded byte-for-byte when bound
//! to the insert statement, so no type translation happens between source and destination.

use std::net::IpAddr;

use cdrs_tokio::frame::message_result::{ColSpec, ColType, ColTypeOption};
use cdrs_tokio::query::QueryValues;
use cdrs_tokio::types::data_serialization_types::{
    decode_bigint, decode_boolean, decode_double, decode_float, decode_inet, decode_int,
    decode_smallint, decode_timestamp, decode_timeuuid, decode_tinyint,
};
use cdrs_tokio::types::value::Value;
use cdrs_tokio::types::CBytes;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::{Error, Result};

/// A single cell, tagged with the type discovered at read time.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Int(i32),
    BigInt(i64),
    SmallInt(i16),
    TinyInt(i8),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Blob(Vec<u8>),
    Uuid(Uuid),
    Inet(IpAddr),
    /// Milliseconds since the unix epoch.
    Timestamp(i64),
    /// Exact wire bytes of any other type (collections, UDTs, tuples, decimals, varints, dates,
    /// times, durations, counters, custom types) and of empty fixed-width values.
    Raw(Vec<u8>),
}

impl CellValue {
    /// Decodes a cell according to its column type. A missing value is `Null`.
    pub fn decode(col_type: &ColTypeOption, cell: &CBytes) -> std::result::Result<Self, String> {
        let Some(bytes) = cell.as_slice() else {
            return Ok(CellValue::Null);
        };

        // fixed-width types can still hold a zero-length value
        if bytes.is_empty() && !matches!(col_type.id, ColType::Ascii | ColType::Varchar) {
            return Ok(if col_type.id == ColType::Blob {
                CellValue::Blob(vec![])
            } else {
                CellValue::Raw(vec![])
            });
        }

        let value = match col_type.id {
            // text which is not valid UTF-8 is passed through untouched
            ColType::Ascii | ColType::Varchar => match std::str::from_utf8(bytes) {
                Ok(text) => CellValue::Text(text.to_string()),
                Err(_) => CellValue::Raw(bytes.to_vec()),
            },
            ColType::Int => CellValue::Int(decode_int(bytes).map_err(|error| error.to_string())?),
            ColType::Bigint => {
                CellValue::BigInt(decode_bigint(bytes).map_err(|error| error.to_string())?)
            }
            ColType::Smallint => {
                CellValue::SmallInt(decode_smallint(bytes).map_err(|error| error.to_string())?)
            }
            ColType::Tinyint => {
                CellValue::TinyInt(decode_tinyint(bytes).map_err(|error| error.to_string())?)
            }
            ColType::Float => {
                CellValue::Float(decode_float(bytes).map_err(|error| error.to_string())?)
            }
            ColType::Double => {
                CellValue::Double(decode_double(bytes).map_err(|error| error.to_string())?)
            }
            ColType::Boolean => {
                CellValue::Boolean(decode_boolean(bytes).map_err(|error| error.to_string())?)
            }
            ColType::Blob => CellValue::Blob(bytes.to_vec()),
            ColType::Uuid | ColType::Timeuuid => {
                CellValue::Uuid(decode_timeuuid(bytes).map_err(|error| error.to_string())?)
            }
            ColType::Inet => {
                CellValue::Inet(decode_inet(bytes).map_err(|error| error.to_string())?)
            }
            ColType::Timestamp => {
                CellValue::Timestamp(decode_timestamp(bytes).map_err(|error| error.to_string())?)
            }
            _ => CellValue::Raw(bytes.to_vec()),
        };

        Ok(value)
    }

    /// Encodes the cell as a bound statement value.
    pub fn into_value(self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Text(value) => Value::new(value),
            CellValue::Int(value) => Value::new(value),
            CellValue::BigInt(value) => Value::new(value),
            CellValue::SmallInt(value) => Value::new(value),
            CellValue::TinyInt(value) => Value::new(value),
            CellValue::Float(value) => Value::new(value),
            CellValue::Double(value) => Value::new(value),
            CellValue::Boolean(value) => Value::new(value),
            CellValue::Uuid(value) => Value::new(value),
            CellValue::Inet(value) => Value::new(value),
            CellValue::Timestamp(value) => Value::new(value),
            CellValue::Blob(value) | CellValue::Raw(value) => Value::Some(value),
        }
    }
}

/// Ordered column name to value mapping, in result set column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    cells: IndexMap<String, CellValue>,
}

impl Row {
    /// Builds a row out of the column specifications of a result set and the raw cells of one
    /// of its rows.
    pub fn decode(col_specs: &[ColSpec], cells: Vec<CBytes>) -> Result<Self> {
        if col_specs.len() != cells.len() {
            return Err(Error::UnexpectedResult(format!(
                "row has {} cells for {} columns",
                cells.len(),
                col_specs.len()
            )));
        }

        col_specs
            .iter()
            .zip(cells)
            .map(|(spec, cell)| {
                CellValue::decode(&spec.col_type, &cell)
                    .map(|value| (spec.name.clone(), value))
                    .map_err(|reason| Error::Decode {
                        column: spec.name.clone(),
                        reason,
                    })
            })
            .collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Values bound by column name.
    pub fn into_query_values(self) -> QueryValues {
        QueryValues::NamedValues(
            self.cells
                .into_iter()
                .map(|(column, value)| (column, value.into_value()))
                .collect(),
        )
    }
}

impl FromIterator<(String, CellValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Row {
            cells: iter.into_iter().collect(),
        }
    }
}

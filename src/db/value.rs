// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Beacon Labs

//! Tagged value types for statement binding and row decoding.
//!
//! Bind parameters and decoded columns are closed enums rather than trait
//! objects: an unsupported value kind is unrepresentable, so a binding
//! contract violation cannot occur at runtime.

use std::collections::HashMap;

use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::ToSql;
use serde::Serialize;

/// A positionally-indexed value bound into a parameterized statement.
///
/// Storage representation:
/// - `Text` → SQL text
/// - `Int64` / `Int32` → SQL integer
/// - `Bool` → SQL integer `1`/`0`
/// - `Null` → SQL null
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Int64(i64),
    Int32(i32),
    Bool(bool),
    Null,
}

impl ToSql for BindValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            BindValue::Text(s) => ToSqlOutput::Borrowed(rusqlite::types::ValueRef::Text(
                s.as_bytes(),
            )),
            BindValue::Int64(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            BindValue::Int32(v) => ToSqlOutput::Owned(Value::Integer(i64::from(*v))),
            BindValue::Bool(v) => ToSqlOutput::Owned(Value::Integer(i64::from(*v))),
            BindValue::Null => ToSqlOutput::Owned(Value::Null),
        })
    }
}

impl From<&str> for BindValue {
    fn from(s: &str) -> Self {
        BindValue::Text(s.to_string())
    }
}

impl From<String> for BindValue {
    fn from(s: String) -> Self {
        BindValue::Text(s)
    }
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        BindValue::Int64(v)
    }
}

impl From<i32> for BindValue {
    fn from(v: i32) -> Self {
        BindValue::Int32(v)
    }
}

impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        BindValue::Bool(v)
    }
}

impl BindValue {
    /// Literal rendering used by the debug statement log.
    ///
    /// Strings are single-quoted, numerics and booleans are bare,
    /// null renders as `null`. Observational only.
    pub fn render(&self) -> String {
        match self {
            BindValue::Text(s) => format!("'{s}'"),
            BindValue::Int64(v) => v.to_string(),
            BindValue::Int32(v) => v.to_string(),
            BindValue::Bool(v) => v.to_string(),
            BindValue::Null => "null".to_string(),
        }
    }
}

/// A decoded result column.
///
/// Null columns are never materialized; their key is absent from the [`Row`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Int64(i64),
    Text(String),
    Bool(bool),
}

impl ColumnValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// One decoded result row: column name → value, null columns omitted.
pub type Row = HashMap<String, ColumnValue>;

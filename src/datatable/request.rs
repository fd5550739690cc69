// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Server-side table request payload.
//!
//! The browser table client sends booleans and numbers either as JSON values
//! or as strings (`"true"`, `"10"`); both are accepted.

use serde::{Deserialize, Deserializer};

use crate::error::ValidationError;

/// One page request from a server-side processed table.
#[derive(Debug, Clone, Deserialize)]
pub struct TableRequest {
    /// Echoed back so the client can match responses to requests.
    #[serde(default, deserialize_with = "lenient_int")]
    pub draw: i64,
    #[serde(default)]
    pub columns: Vec<ColumnRequest>,
    #[serde(default)]
    pub search: SearchValue,
    #[serde(default)]
    pub order: Vec<OrderRequest>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub start: i64,
    /// Page size; zero or negative means every row.
    #[serde(default = "unlimited", deserialize_with = "lenient_int")]
    pub length: i64,
}

impl Default for TableRequest {
    fn default() -> Self {
        Self {
            draw: 0,
            columns: Vec::new(),
            search: SearchValue::default(),
            order: Vec::new(),
            start: 0,
            length: unlimited(),
        }
    }
}

/// A column as the client knows it.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnRequest {
    #[serde(default)]
    pub data: serde_json::Value,
    /// Public column name, matched against the table's allow-list.
    #[serde(default)]
    pub name: String,
    #[serde(default = "yes", deserialize_with = "lenient_bool")]
    pub searchable: bool,
    #[serde(default = "yes", deserialize_with = "lenient_bool")]
    pub orderable: bool,
    #[serde(default)]
    pub search: SearchValue,
}

impl ColumnRequest {
    /// A searchable, orderable column named `name`.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            data: serde_json::Value::String(name.clone()),
            name,
            searchable: true,
            orderable: true,
            search: SearchValue::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchValue {
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
    /// Accepted for compatibility. Regex search is not supported.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub regex: bool,
}

impl SearchValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            regex: false,
        }
    }
}

/// Sort on `columns[column]`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    #[serde(deserialize_with = "lenient_int")]
    pub column: i64,
    #[serde(default = "ascending")]
    pub dir: String,
}

impl TableRequest {
    /// Decode a request from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MalformedRequest` on invalid JSON or field types.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::MalformedRequest {
            message: e.to_string(),
        })
    }
}

const fn yes() -> bool {
    true
}

const fn unlimited() -> i64 {
    -1
}

fn ascending() -> String {
    "asc".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntLike {
    Int(i64),
    Text(String),
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match BoolLike::deserialize(deserializer)? {
        BoolLike::Bool(b) => Ok(b),
        BoolLike::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean, got '{other}'"
            ))),
        },
    }
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match IntLike::deserialize(deserializer)? {
        IntLike::Int(i) => Ok(i),
        IntLike::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, got '{s}'"))),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

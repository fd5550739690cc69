// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Column allow-lists and table sources.

use crate::error::QueryError;

/// How a column is searched and ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Case-insensitive exact match.
    Int,
    /// Calendar-day range match on Unix seconds.
    Timestamp,
    /// Case-insensitive substring match.
    Text,
}

/// One allow-listed column: the public name the client may send, and the
/// database identifier emitted in SQL.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub db_column: &'static str,
    pub kind: ColumnType,
    pub orderable: bool,
}

impl ColumnDef {
    pub const fn new(name: &'static str, kind: ColumnType) -> Self {
        Self {
            name,
            db_column: name,
            kind,
            orderable: true,
        }
    }

    #[must_use]
    pub const fn db(mut self, db_column: &'static str) -> Self {
        self.db_column = db_column;
        self
    }

    #[must_use]
    pub const fn unordered(mut self) -> Self {
        self.orderable = false;
        self
    }
}

/// A value bound into generated SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Int(i64),
    Text(String),
}

/// What a table queries: base statements, an optional fixed filter, and the
/// column allow-list.
///
/// `select` and `count` must not carry their own `WHERE`, `ORDER BY` or `LIMIT`.
#[derive(Debug, Clone)]
pub struct TableSource {
    pub select: &'static str,
    /// Unique key column, used as the final sort tiebreaker.
    pub key: &'static str,
    pub count: &'static str,
    pub fixed_where: Option<&'static str>,
    pub fixed_params: Vec<BindValue>,
    pub columns: &'static [ColumnDef],
}

impl TableSource {
    /// Look up an allow-listed column by public name.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UnknownColumn` if the name is not allow-listed.
    pub fn column(&self, name: &str) -> Result<&'static ColumnDef, QueryError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| QueryError::UnknownColumn {
                name: name.to_string(),
            })
    }
}

// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Server-side processing: turns a [`TableRequest`] into parametrized SQL.
//!
//! ```text
//! TableRequest ──build()──> SspQuery (validated against the allow-list)
//!                              |
//!        +---------------------+----------------------+
//!        |                     |                      |
//!   total_count_query    page_query            filtered_count_query
//!   COUNT + fixed        SELECT + fixed        COUNT + fixed
//!                        AND (col AND col)     AND (col AND col)
//!                        AND (glob OR glob)    AND (glob OR glob)
//!                        ORDER BY .., key
//!                        LIMIT ? OFFSET ?
//! ```
//!
//! Only allow-listed column identifiers reach the SQL text. Every value is bound.

use chrono::FixedOffset;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::columns::{BindValue, ColumnDef, ColumnType, TableSource};
use super::dates::{day_bounds, parse_day};
use super::request::TableRequest;
use crate::error::{PatcherResult, QueryError};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// # Errors
    ///
    /// Returns `QueryError::InvalidDirection` for anything but `asc`/`desc`.
    pub fn parse(dir: &str) -> Result<Self, QueryError> {
        match dir.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(QueryError::InvalidDirection {
                dir: dir.to_string(),
            }),
        }
    }

    const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    IntEq { column: &'static str, value: String },
    TextLike { column: &'static str, pattern: String },
    DayRange { column: &'static str, from: i64, to: i64 },
    /// Unparseable date: matches nothing.
    Never,
}

impl Predicate {
    fn for_column(def: &ColumnDef, value: &str, offset: FixedOffset) -> Self {
        match def.kind {
            ColumnType::Int => Self::IntEq {
                column: def.db_column,
                value: value.trim().to_owned(),
            },
            ColumnType::Text => Self::TextLike {
                column: def.db_column,
                pattern: format!("%{}%", escape_like(value)),
            },
            ColumnType::Timestamp => parse_day(value, offset)
                .and_then(|day| day_bounds(day, offset))
                .map_or(Self::Never, |(from, to)| Self::DayRange {
                    column: def.db_column,
                    from,
                    to,
                }),
        }
    }

    fn push(&self, qb: &mut QueryBuilder<'static, Sqlite>) {
        match self {
            Self::IntEq { column, value } => {
                qb.push(format_args!("LOWER(CAST({column} AS TEXT)) = LOWER("));
                qb.push_bind(value.clone());
                qb.push(")");
            }
            Self::TextLike { column, pattern } => {
                qb.push(format_args!("LOWER({column}) LIKE LOWER("));
                qb.push_bind(pattern.clone());
                qb.push(") ESCAPE '\\'");
            }
            Self::DayRange { column, from, to } => {
                qb.push(format_args!("({column} >= "));
                qb.push_bind(*from);
                qb.push(format_args!(" AND {column} < "));
                qb.push_bind(*to);
                qb.push(")");
            }
            Self::Never => {
                qb.push("1 = 0");
            }
        }
    }
}

/// Escape `LIKE` wildcards so the value matches literally.
fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// One page of rows plus counts, in the table client's response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableResult<T> {
    pub draw: i64,
    #[serde(rename = "recordsTotal")]
    pub records_total: i64,
    #[serde(rename = "recordsFiltered")]
    pub records_filtered: i64,
    pub data: Vec<T>,
}

/// A validated table query.
#[derive(Debug, Clone)]
pub struct SspQuery<'s> {
    source: &'s TableSource,
    draw: i64,
    filters: Vec<Predicate>,
    global: Vec<Predicate>,
    order: Vec<(&'static ColumnDef, Direction)>,
    start: i64,
    length: i64,
}

impl<'s> SspQuery<'s> {
    /// Validate `request` against `source` and plan the query.
    ///
    /// Timestamp searches are interpreted as calendar days in `offset`.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] for an unknown column in a search or order
    /// entry, an out-of-range order index, a non-orderable column or an
    /// unknown direction.
    pub fn build(
        source: &'s TableSource,
        request: &TableRequest,
        offset: FixedOffset,
    ) -> Result<Self, QueryError> {
        let mut filters = Vec::new();
        for column in &request.columns {
            if column.search.value.is_empty() || !column.searchable {
                continue;
            }
            let def = source.column(&column.name)?;
            filters.push(Predicate::for_column(def, &column.search.value, offset));
        }

        let mut global = Vec::new();
        if !request.search.value.is_empty() {
            for column in &request.columns {
                if column.name.is_empty() || !column.searchable {
                    continue;
                }
                let def = source.column(&column.name)?;
                global.push(Predicate::for_column(def, &request.search.value, offset));
            }
        }

        let mut order = Vec::with_capacity(request.order.len());
        for entry in &request.order {
            let column = usize::try_from(entry.column)
                .ok()
                .and_then(|i| request.columns.get(i))
                .ok_or(QueryError::OrderIndexOutOfRange {
                    index: usize::try_from(entry.column).unwrap_or(usize::MAX),
                    columns: request.columns.len(),
                })?;
            let def = source.column(&column.name)?;
            if !def.orderable || !column.orderable {
                return Err(QueryError::ColumnNotOrderable {
                    name: column.name.clone(),
                });
            }
            order.push((def, Direction::parse(&entry.dir)?));
        }

        Ok(Self {
            source,
            draw: request.draw,
            filters,
            global,
            order,
            start: request.start.max(0),
            length: request.length,
        })
    }

    fn push_fixed_where(&self, qb: &mut QueryBuilder<'static, Sqlite>) -> bool {
        let Some(clause) = self.source.fixed_where else {
            return false;
        };
        qb.push(" WHERE (");
        let mut parts = clause.split('?');
        if let Some(first) = parts.next() {
            qb.push(first);
        }
        let mut params = self.source.fixed_params.iter();
        for part in parts {
            match params.next() {
                Some(BindValue::Int(v)) => {
                    qb.push_bind(*v);
                }
                Some(BindValue::Text(v)) => {
                    qb.push_bind(v.clone());
                }
                None => {
                    qb.push_bind(None::<i64>);
                }
            }
            qb.push(part);
        }
        qb.push(")");
        true
    }

    fn push_where(&self, qb: &mut QueryBuilder<'static, Sqlite>) {
        let mut has_where = self.push_fixed_where(qb);
        for (group, joiner) in [(&self.filters, " AND "), (&self.global, " OR ")] {
            if group.is_empty() {
                continue;
            }
            qb.push(if has_where { " AND (" } else { " WHERE (" });
            has_where = true;
            for (i, predicate) in group.iter().enumerate() {
                if i > 0 {
                    qb.push(joiner);
                }
                predicate.push(qb);
            }
            qb.push(")");
        }
    }

    /// Unfiltered count, restricted by the fixed `WHERE` only.
    #[must_use]
    pub fn total_count_query(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(self.source.count);
        self.push_fixed_where(&mut qb);
        qb
    }

    /// Count of rows matching every filter.
    #[must_use]
    pub fn filtered_count_query(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(self.source.count);
        self.push_where(&mut qb);
        qb
    }

    /// The requested page.
    #[must_use]
    pub fn page_query(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(self.source.select);
        self.push_where(&mut qb);

        qb.push(" ORDER BY ");
        for (def, dir) in &self.order {
            match def.kind {
                ColumnType::Text => qb.push(format_args!("CAST({} AS TEXT)", def.db_column)),
                ColumnType::Int | ColumnType::Timestamp => qb.push(def.db_column),
            };
            qb.push(format_args!(" {}, ", dir.sql()));
        }
        qb.push(format_args!("{} ASC", self.source.key));

        if self.length > 0 {
            qb.push(" LIMIT ");
            qb.push_bind(self.length);
            qb.push(" OFFSET ");
            qb.push_bind(self.start);
        } else if self.start > 0 {
            qb.push(" LIMIT -1 OFFSET ");
            qb.push_bind(self.start);
        }
        qb
    }

    /// Run the three queries.
    ///
    /// # Errors
    ///
    /// Returns `PatcherError::Store` on database failure.
    pub async fn fetch<T>(&self, pool: &SqlitePool) -> PatcherResult<TableResult<T>>
    where
        T: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut total = self.total_count_query();
        let records_total: i64 = total.build_query_scalar().fetch_one(pool).await?;

        let mut page = self.page_query();
        let data: Vec<T> = page.build_query_as::<T>().fetch_all(pool).await?;

        let mut filtered = self.filtered_count_query();
        let records_filtered: i64 = filtered.build_query_scalar().fetch_one(pool).await?;

        debug!(
            draw = self.draw,
            records_total,
            records_filtered,
            rows = data.len(),
            "table page fetched"
        );

        Ok(TableResult {
            draw: self.draw,
            records_total,
            records_filtered,
            data,
        })
    }
}

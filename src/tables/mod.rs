// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! The two server-side tables: every patch, and the reports of one patch.
//!
//! ```text
//! TableRequest --> SspQuery (patches / patch_reports allow-list)
//!                     |
//!                     v
//!               Vec<Patch|Report> --Renderer--> PatchRow / ReportRow
//! ```

#[cfg(test)]
mod tests;

use serde::Serialize;
use sqlx::SqlitePool;

use crate::datatable::{
    BindValue, ColumnDef, ColumnType, SspQuery, TableRequest, TableResult, TableSource,
};
use crate::error::PatcherResult;
use crate::render::Renderer;
use crate::store::{Patch, Report};

/// Searchable and orderable columns of the patches table.
pub const PATCH_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ColumnType::Int),
    ColumnDef::new("name", ColumnType::Text),
    ColumnDef::new("status", ColumnType::Int),
    ColumnDef::new("timeapplied", ColumnType::Timestamp),
    ColumnDef::new("timerestored", ColumnType::Timestamp),
    ColumnDef::new("timemodified", ColumnType::Timestamp),
    ColumnDef::new("timecreated", ColumnType::Timestamp),
];

/// Searchable and orderable columns of a patch's reports table.
pub const REPORT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", ColumnType::Int),
    ColumnDef::new("timecreated", ColumnType::Timestamp),
    ColumnDef::new("status", ColumnType::Int),
    ColumnDef::new("operation", ColumnType::Text),
];

#[must_use]
pub fn patches_source() -> TableSource {
    TableSource {
        select: "SELECT * FROM patches",
        key: "id",
        count: "SELECT COUNT(*) FROM patches",
        fixed_where: None,
        fixed_params: Vec::new(),
        columns: PATCH_COLUMNS,
    }
}

/// Reports of `patchid` only.
#[must_use]
pub fn reports_source(patchid: i64) -> TableSource {
    TableSource {
        select: "SELECT * FROM patch_reports",
        key: "id",
        count: "SELECT COUNT(*) FROM patch_reports",
        fixed_where: Some("patchid = ?"),
        fixed_params: vec![BindValue::Int(patchid)],
        columns: REPORT_COLUMNS,
    }
}

/// One rendered row of the patches table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchRow {
    pub id: i64,
    pub name: String,
    pub lastaction: &'static str,
    pub applied: String,
    pub restored: String,
    pub modified: String,
    pub created: String,
    pub actions: String,
}

impl PatchRow {
    /// # Errors
    ///
    /// Returns an error if the action markup fails to render.
    pub fn render(patch: Patch, renderer: &Renderer) -> PatcherResult<Self> {
        Ok(Self {
            id: patch.id,
            lastaction: patch.status.label(),
            applied: renderer.date(patch.timeapplied),
            restored: renderer.date(patch.timerestored),
            modified: renderer.date(Some(patch.timemodified)),
            created: renderer.date(Some(patch.timecreated)),
            actions: renderer.patch_actions(patch.id)?,
            name: patch.name,
        })
    }
}

/// One rendered row of a reports table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub id: i64,
    pub status: &'static str,
    pub operation: &'static str,
    pub timecreated: String,
    pub actions: String,
}

impl ReportRow {
    /// # Errors
    ///
    /// Returns an error if the action markup fails to render.
    pub fn render(report: &Report, renderer: &Renderer) -> PatcherResult<Self> {
        Ok(Self {
            id: report.id,
            status: report.status.label(),
            operation: report.operation.label(),
            timecreated: renderer.date(Some(report.timecreated)),
            actions: renderer.report_actions(report.id)?,
        })
    }
}

fn render_rows<T, R>(
    page: TableResult<T>,
    mut render: impl FnMut(T) -> PatcherResult<R>,
) -> PatcherResult<TableResult<R>> {
    let data = page
        .data
        .into_iter()
        .map(&mut render)
        .collect::<PatcherResult<Vec<R>>>()?;
    Ok(TableResult {
        draw: page.draw,
        records_total: page.records_total,
        records_filtered: page.records_filtered,
        data,
    })
}

/// Page through every patch.
///
/// # Errors
///
/// Returns a query error for an invalid request, or a storage error.
pub async fn patches_page(
    pool: &SqlitePool,
    renderer: &Renderer,
    request: &TableRequest,
) -> PatcherResult<TableResult<PatchRow>> {
    let source = patches_source();
    let page = SspQuery::build(&source, request, renderer.offset())?
        .fetch::<Patch>(pool)
        .await?;
    render_rows(page, |patch| PatchRow::render(patch, renderer))
}

/// Page through the reports of `patchid`.
///
/// # Errors
///
/// Returns a query error for an invalid request, or a storage error.
pub async fn reports_page(
    pool: &SqlitePool,
    renderer: &Renderer,
    patchid: i64,
    request: &TableRequest,
) -> PatcherResult<TableResult<ReportRow>> {
    let source = reports_source(patchid);
    let page = SspQuery::build(&source, request, renderer.offset())?
        .fetch::<Report>(pool)
        .await?;
    render_rows(page, |report| ReportRow::render(&report, renderer))
}

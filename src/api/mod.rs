// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote-callable endpoints.
//!
//! ```text
//! endpoint(ctx, principal, args)
//!   principal.require(capability)     PermissionDenied (403)
//!   decode / validate input           Validation, Query (400)
//!   engine | managers | tables        NotFound (404), system (500)
//!        |
//!        v
//!   Response::raw / Response::wrapped -> JSON
//! ```
//!
//! | Endpoint              | Capability          |
//! |-----------------------|---------------------|
//! | get_patches           | viewpatch           |
//! | get_patch_reports     | viewreports         |
//! | apply_patch           | applypatch          |
//! | restore_patch         | restorepatch        |
//! | delete_patch          | deletepatch         |
//! | delete_patch_report   | deletepatchreport   |
//! | get_patch_info        | viewpatch           |
//! | get_patch_report_info | viewreports         |
//! | add_patch             | addpatch            |
//! | edit_patch            | editpatch           |
//! | check_patch           | applypatch / restorepatch |
//! | get_options           | config              |

pub mod access;
pub mod response;

#[cfg(test)]
mod tests;

pub use access::{Capability, CapabilityChecker, Principal};
pub use response::{Envelope, ErrorBody, ErrorResponse, OperationResult, Response};

use crate::config::Config;
use crate::context::PatcherContext;
use crate::datatable::{TableRequest, TableResult};
use crate::engine::CheckOutcome;
use crate::error::PatcherResult;
use crate::manager::{NewPatch, PatchInfo, PatchUpdate, ReportInfo, UploadedFile};
use crate::store::Operation;
use crate::tables::{self, PatchRow, ReportRow};

/// One page of the patches table.
///
/// # Errors
///
/// `PermissionDenied`, `MalformedRequest` or a `QueryError` for a bad request,
/// `Store` on database failure.
pub async fn get_patches(
    ctx: &PatcherContext,
    principal: &dyn CapabilityChecker,
    request_json: &str,
) -> PatcherResult<TableResult<PatchRow>> {
    principal.require(Capability::VIEWPATCH)?;
    let request = TableRequest::from_json(request_json)?;
    tables::patches_page(ctx.db.pool(), &ctx.renderer, &request).await
}

/// One page of a patch's reports.
///
/// # Errors
///
/// As [`get_patches`].
pub async fn get_patch_reports(
    ctx: &PatcherContext,
    principal: &dyn CapabilityChecker,
    patch_id: i64,
    request_json: &str,
) -> PatcherResult<TableResult<ReportRow>> {
    principal.require(Capability::VIEWREPORTS)?;
    let request = TableRequest::from_json(request_json)?;
    tables::reports_page(ctx.db.pool(), &ctx.renderer, patch_id, &request).await
}

async fn run_operation(
    ctx: &PatcherContext,
    patch_id: i64,
    operation: Operation,
) -> PatcherResult<OperationResult> {
    let outcome = ctx.engine.perform(patch_id, operation).await?;
    Ok(OperationResult {
        timestamp: ctx.renderer.date(outcome.patch.last_time_of(operation)),
        status: outcome.patch.status.label(),
    })
}

/// Run `git apply` for a patch.
///
/// # Errors
///
/// `PermissionDenied`, `GitPathNotFound`, `NotFound` for the patch or its
/// file, `RepeatedOperation` when repeats are disabled.
pub async fn apply_patch(
    ctx: &PatcherContext,
    principal: &dyn CapabilityChecker,
    patch_id: i64,
) -> PatcherResult<OperationResult> {
    principal.require(Capability::APPLYPATCH)?;
    run_operation(ctx, patch_id, Operation::Apply).await
}

/// Run `git apply -R` for a patch.
///
/// # Errors
///
/// As [`apply_patch`].
pub async fn restore_patch(
    ctx: &PatcherContext,
    principal: &dyn CapabilityChecker,
    patch_id: i64,
) -> PatcherResult<OperationResult> {
    principal.require(Capability::RESTOREPATCH)?;
    run_operation(ctx, patch_id, Operation::Restore).await
}

/// `git apply --check` for a patch, under the capability of `operation`.
///
/// # Errors
///
/// As [`apply_patch`], except that repeats are never rejected.
pub async fn check_patch(
    ctx: &PatcherContext,
    principal: &dyn CapabilityChecker,
    patch_id: i64,
    operation: Operation,
) -> PatcherResult<CheckOutcome> {
    principal.require(match operation {
        Operation::Apply => Capability::APPLYPATCH,
        Operation::Restore => Capability::RESTOREPATCH,
    })?;
    ctx.engine.check(patch_id, operation).await
}

/// # Errors
///
/// `PermissionDenied`, or a storage/file error.
pub async fn delete_patch(
    ctx: &PatcherContext,
    principal: &dyn CapabilityChecker,
    patch_id: i64,
) -> PatcherResult<bool> {
    principal.require(Capability::DELETEPATCH)?;
    ctx.patches.delete_patch(patch_id).await
}

/// # Errors
///
/// `PermissionDenied`, or a storage error.
pub async fn delete_patch_report(
    ctx: &PatcherContext,
    principal: &dyn CapabilityChecker,
    report_id: i64,
) -> PatcherResult<bool> {
    principal.require(Capability::DELETEPATCHREPORT)?;
    ctx.reports.delete_report(report_id).await
}

/// # Errors
///
/// `PermissionDenied`, or `NotFound` for the patch or its file.
pub async fn get_patch_info(
    ctx: &PatcherContext,
    principal: &dyn CapabilityChecker,
    patch_id: i64,
) -> PatcherResult<PatchInfo> {
    principal.require(Capability::VIEWPATCH)?;
    ctx.patches.get_patch_info(patch_id).await
}

/// # Errors
///
/// `PermissionDenied`, or `NotFound` for the report.
pub async fn get_patch_report_info(
    ctx: &PatcherContext,
    principal: &dyn CapabilityChecker,
    report_id: i64,
) -> PatcherResult<ReportInfo> {
    principal.require(Capability::VIEWREPORTS)?;
    ctx.reports.get_report_info(report_id).await
}

/// Upload a new patch. Returns its id.
///
/// # Errors
///
/// `PermissionDenied`, or a validation error for the name or file.
pub async fn add_patch(
    ctx: &PatcherContext,
    principal: &dyn CapabilityChecker,
    name: &str,
    file: UploadedFile,
) -> PatcherResult<i64> {
    principal.require(Capability::ADDPATCH)?;
    ctx.patches
        .create_patch(NewPatch {
            name: name.to_string(),
            filename: file.filename,
            content: file.content,
        })
        .await
}

/// Rename a patch and optionally replace its file.
///
/// # Errors
///
/// `PermissionDenied`, or a validation error for the name or file.
pub async fn edit_patch(
    ctx: &PatcherContext,
    principal: &dyn CapabilityChecker,
    patch_id: i64,
    name: &str,
    file: Option<UploadedFile>,
) -> PatcherResult<bool> {
    principal.require(Capability::EDITPATCH)?;
    ctx.patches
        .update_patch(PatchUpdate {
            id: patch_id,
            name: name.to_string(),
            file,
        })
        .await
}

/// Resolved configuration, one `key = value` line per option.
///
/// # Errors
///
/// `PermissionDenied` without the `config` capability.
pub fn get_options(
    config: &Config,
    principal: &dyn CapabilityChecker,
) -> PatcherResult<Vec<String>> {
    principal.require(Capability::CONFIG)?;
    Ok(config.format_options())
}

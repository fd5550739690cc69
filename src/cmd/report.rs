// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Report commands.

use super::{Session, table_request};
use crate::api::{self, Response};
use crate::cli::report::{ReportArgs, ReportSubcommand};
use crate::error::Result;

/// Main handler for the report command.
///
/// # Errors
///
/// Returns an error if the request file cannot be read.
pub async fn run_report_command(args: &ReportArgs, session: &Session) -> Result<Response> {
    let ctx = &session.ctx;
    let principal = &session.principal;

    let response = match &args.subcommand {
        ReportSubcommand::List(list) => {
            let request = table_request(&list.table).await?;
            Response::raw(api::get_patch_reports(ctx, principal, list.patch, &request).await)
        }
        ReportSubcommand::Info(report) => {
            Response::wrapped(api::get_patch_report_info(ctx, principal, report.id).await)
        }
        ReportSubcommand::Delete(report) => {
            Response::wrapped(api::delete_patch_report(ctx, principal, report.id).await)
        }
    };
    Ok(response)
}

// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Patch commands.

use super::{Session, read_upload, table_request};
use crate::api::{self, Response};
use crate::cli::patch::{PatchArgs, PatchSubcommand};
use crate::error::Result;
use crate::store::Operation;

/// Main handler for the patch command.
///
/// Endpoint failures come back as an error [`Response`]; `Err` is reserved
/// for local problems such as an unreadable upload.
///
/// # Errors
///
/// Returns an error if a request or patch file cannot be read.
pub async fn run_patch_command(args: &PatchArgs, session: &Session) -> Result<Response> {
    let ctx = &session.ctx;
    let principal = &session.principal;

    let response = match &args.subcommand {
        PatchSubcommand::List(table) => {
            let request = table_request(table).await?;
            Response::raw(api::get_patches(ctx, principal, &request).await)
        }
        PatchSubcommand::Add(add) => {
            let file = read_upload(&add.file).await?;
            Response::wrapped(api::add_patch(ctx, principal, &add.name, file).await)
        }
        PatchSubcommand::Edit(edit) => {
            let file = match &edit.file {
                Some(path) => Some(read_upload(path).await?),
                None => None,
            };
            Response::wrapped(api::edit_patch(ctx, principal, edit.id, &edit.name, file).await)
        }
        PatchSubcommand::Info(patch) => {
            Response::wrapped(api::get_patch_info(ctx, principal, patch.id).await)
        }
        PatchSubcommand::Apply(patch) => {
            Response::wrapped(api::apply_patch(ctx, principal, patch.id).await)
        }
        PatchSubcommand::Restore(patch) => {
            Response::wrapped(api::restore_patch(ctx, principal, patch.id).await)
        }
        PatchSubcommand::Check(check) => {
            let operation = if check.restore {
                Operation::Restore
            } else {
                Operation::Apply
            };
            Response::wrapped(api::check_patch(ctx, principal, check.id, operation).await)
        }
        PatchSubcommand::Delete(patch) => {
            Response::wrapped(api::delete_patch(ctx, principal, patch.id).await)
        }
    };
    Ok(response)
}

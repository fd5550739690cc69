// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Patch command arguments.
//!
//! # Subcommands
//!
//! ```text
//! patch list [--request JSON | --request-file FILE]
//! patch add -n NAME -f FILE
//! patch edit ID -n NAME [-f FILE]
//! patch info ID
//! patch apply ID
//! patch restore ID
//! patch check ID [--restore]
//! patch delete ID
//! ```

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Arguments for the `patch` command.
#[derive(Debug, Clone, Args)]
pub struct PatchArgs {
    /// Patch subcommand.
    #[command(subcommand)]
    pub subcommand: PatchSubcommand,
}

/// Patch subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum PatchSubcommand {
    /// Prints one page of the patches table.
    List(TableArgs),

    /// Uploads a new patch.
    Add(AddArgs),

    /// Renames a patch and optionally replaces its file.
    Edit(EditArgs),

    /// Prints a patch's name and file content.
    Info(PatchIdArgs),

    /// Applies a patch to the application tree.
    Apply(PatchIdArgs),

    /// Reverts a patch from the application tree.
    Restore(PatchIdArgs),

    /// Checks whether a patch would apply (or revert) cleanly.
    Check(CheckArgs),

    /// Deletes a patch, its reports and its file.
    Delete(PatchIdArgs),
}

/// A datatable request, inline or from a file.
#[derive(Debug, Clone, Default, Args)]
pub struct TableArgs {
    /// Request as JSON, e.g. '{"start": 0, "length": 10}'.
    #[arg(short = 'r', long = "request", value_name = "JSON", conflicts_with = "request_file")]
    pub request: Option<String>,

    /// Reads the request JSON from a file.
    #[arg(long = "request-file", value_name = "FILE")]
    pub request_file: Option<PathBuf>,
}

/// Arguments for the add subcommand.
#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    /// Unique patch name.
    #[arg(short = 'n', long, required = true)]
    pub name: String,

    /// Diff file to upload (.diff or .patch).
    #[arg(short = 'f', long, value_name = "FILE", required = true)]
    pub file: PathBuf,
}

/// Arguments for the edit subcommand.
#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    /// Patch id.
    #[arg(value_name = "ID")]
    pub id: i64,

    /// New patch name.
    #[arg(short = 'n', long, required = true)]
    pub name: String,

    /// Replacement diff file.
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// A single patch id.
#[derive(Debug, Clone, Args)]
pub struct PatchIdArgs {
    /// Patch id.
    #[arg(value_name = "ID")]
    pub id: i64,
}

/// Arguments for the check subcommand.
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Patch id.
    #[arg(value_name = "ID")]
    pub id: i64,

    /// Checks the reverse application instead.
    #[arg(short = 'R', long)]
    pub restore: bool,
}

// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Report command arguments.

use clap::{Args, Subcommand};

use super::patch::TableArgs;

/// Arguments for the `report` command.
#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub subcommand: ReportSubcommand,
}

/// Report subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ReportSubcommand {
    /// Prints one page of a patch's reports.
    List(ReportListArgs),

    /// Prints the date and captured output of a report.
    Info(ReportIdArgs),

    /// Deletes a single report.
    Delete(ReportIdArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ReportListArgs {
    /// Patch whose reports are listed.
    #[arg(short = 'p', long = "patch", value_name = "ID", required = true)]
    pub patch: i64,

    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ReportIdArgs {
    /// Report id.
    #[arg(value_name = "ID")]
    pub id: i64,
}

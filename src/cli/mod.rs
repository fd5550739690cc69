// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for codepatcher using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! codepatcher [global options] <command>
//! patch {list|add|edit|info|apply|restore|check|delete}
//! report {list|info|delete}
//! options
//! configs
//! version
//! ```

pub mod global;
pub mod patch;
pub mod report;

#[cfg(test)]
mod tests;

use crate::cli::global::GlobalOptions;
use crate::cli::patch::PatchArgs;
use crate::cli::report::ReportArgs;
use clap::{Parser, Subcommand};

/// Code Patch Manager
///
/// Uploads diff files and applies or reverts them on an application tree.
#[derive(Debug, Parser)]
#[command(
    name = "codepatcher",
    author,
    version,
    about = "Code Patch Manager",
    long_about = "codepatcher Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Stores uploaded diff files and applies or reverts them with\n\
                  `git apply` on the configured application root. Every attempt\n\
                  is kept as a report with the exit code and output of git.\n\
                  Responses are printed to stdout as JSON; logs go to stderr.",
    after_help = "CONFIG FILES:\n\n\
                  By default, codepatcher loads `codepatcher.toml` from the current\n\
                  directory if it exists. Additional files can be specified with\n\
                  --config, those are loaded after it. CODEPATCHER_* environment\n\
                  variables (e.g. CODEPATCHER_PATCHER__GIT) and --set override both.\n\
                  Use --no-default-config to skip `codepatcher.toml`."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their resolved values.
    Options,

    /// Lists the configuration files used.
    Configs,

    /// Manages patches.
    Patch(PatchArgs),

    /// Manages operation reports.
    Report(ReportArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}

// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git adapter.
//!
//! ```text
//! [patcher] git = "/usr/bin/git" | "git"
//!        |
//!        v
//! GitExecutable::resolve()   absolute file, or bare name via PATH
//!        |
//!        v
//! ApplyCommand               git apply [-R] [--check] <abs patch>
//!   cwd = [patcher] root     stdout+stderr merged, timeout
//!        |
//!        v
//! ApplyOutcome { exit_code, output, timed_out, elapsed }
//! ```
//!
//! A non-zero exit of `git apply` is data, not an error.

mod apply;

#[cfg(test)]
mod tests;

pub use apply::{ApplyCommand, ApplyOutcome, check};

use std::path::{Path, PathBuf};

use crate::core::process::builder::ProcessBuilder;
use crate::error::ConfigError;

/// A validated git executable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitExecutable {
    path: PathBuf,
}

impl GitExecutable {
    /// Validate the configured git command.
    ///
    /// A path with a directory part must name an existing file. A bare name
    /// (`git`) is looked up through `PATH`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::GitPathNotFound` when nothing is configured or the
    /// path does not resolve.
    pub fn resolve(configured: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(configured) = configured.filter(|p| !p.as_os_str().is_empty()) else {
            return Err(ConfigError::GitPathNotFound { path: None });
        };
        let not_found = || ConfigError::GitPathNotFound {
            path: Some(configured.display().to_string()),
        };

        if configured.components().count() > 1 || configured.is_absolute() {
            return if configured.is_file() {
                Ok(Self {
                    path: configured.to_path_buf(),
                })
            } else {
                Err(not_found())
            };
        }

        let name = configured.to_str().ok_or_else(not_found)?;
        ProcessBuilder::find(name)
            .map(|path| Self { path })
            .ok_or_else(not_found)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

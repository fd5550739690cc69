// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `git apply` invocations.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::GitExecutable;
use crate::config::types::DEFAULT_TIMEOUT_SECS;
use crate::core::process::builder::ProcessBuilder;
use crate::error::ProcessError;
use crate::store::Operation;

/// Result of one `git apply` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Exit code, -1 when killed on timeout.
    pub exit_code: i32,
    /// Merged stdout/stderr lines joined with `\n`.
    pub output: String,
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl ApplyOutcome {
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// `git apply [-R] [--check] <patch>` run in the application root.
#[derive(Debug, Clone)]
pub struct ApplyCommand {
    git: PathBuf,
    root: PathBuf,
    patch_file: PathBuf,
    operation: Operation,
    check: bool,
    timeout: Duration,
}

impl ApplyCommand {
    pub fn new(
        git: &GitExecutable,
        root: impl Into<PathBuf>,
        patch_file: impl Into<PathBuf>,
        operation: Operation,
    ) -> Self {
        Self {
            git: git.path().to_path_buf(),
            root: root.into(),
            patch_file: patch_file.into(),
            operation,
            check: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Dry run: only report whether the patch would apply.
    #[must_use]
    pub const fn check_only(mut self) -> Self {
        self.check = true;
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments after the git executable.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["apply".to_string()];
        if self.operation == Operation::Restore {
            args.push("-R".to_string());
        }
        if self.check {
            args.push("--check".to_string());
        }
        args.push(self.patch_file.display().to_string());
        args
    }

    fn process(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.git)
            .args(self.args())
            .cwd(&self.root)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GCM_INTERACTIVE", "never")
            .timeout(self.timeout)
            .name("git")
    }

    /// The full command line, for logging.
    #[must_use]
    pub fn command_line(&self) -> String {
        self.process().command_line()
    }

    /// Run the command.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessError`] only when git cannot be started or waited on.
    /// Non-zero exits and timeouts are reported in the [`ApplyOutcome`].
    pub async fn run(&self) -> Result<ApplyOutcome, ProcessError> {
        let started = Instant::now();
        let output = self.process().run().await?;
        let elapsed = started.elapsed();

        let mut text = output.output().to_string();
        if output.timed_out() {
            warn!(
                operation = %self.operation,
                timeout_secs = self.timeout.as_secs(),
                "git apply timed out"
            );
            if !text.is_empty() {
                text.push('\n');
            }
            let _ = write!(
                text,
                "operation timed out after {} seconds",
                self.timeout.as_secs()
            );
        }

        debug!(
            operation = %self.operation,
            exit_code = output.exit_code(),
            elapsed_ms = elapsed.as_millis(),
            "git apply finished"
        );

        Ok(ApplyOutcome {
            exit_code: output.exit_code(),
            output: text,
            timed_out: output.timed_out(),
            elapsed,
        })
    }
}

/// Dry-run `operation` of `patch_file` against `root` with `git apply --check`.
///
/// # Errors
///
/// See [`ApplyCommand::run`].
pub async fn check(
    git: &GitExecutable,
    root: &Path,
    patch_file: &Path,
    operation: Operation,
    timeout: Duration,
) -> Result<ApplyOutcome, ProcessError> {
    ApplyCommand::new(git, root, patch_file, operation)
        .check_only()
        .timeout(timeout)
        .run()
        .await
}

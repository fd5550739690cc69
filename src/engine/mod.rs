// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Apply/restore state machine.
//!
//! ```text
//! perform_operation(id, "apply" | "restore")
//!   parse action            OperationNotFound / InvalidOperation
//!   resolve git             GitPathNotFound
//!   check root              InvalidValue [patcher] root
//!   lock(id)                single flight per patch
//!   load patch              NotFound::Patch
//!   repeat policy           RepeatedOperation (allow_repeat = false)
//!   locate stored file      NotFound::PatchFile
//!   git apply [-R] <blob>   exit code + merged output, timeout -> -1
//!   record report + status  one transaction
//!
//!   CLEAN ----apply----> APPLIED
//!     |                   ^   |
//!   restore           apply   restore
//!     v                   |   v
//!   RESTORED <------------+---+
//! ```

mod locks;

#[cfg(test)]
mod tests;

pub use locks::PatchLocks;

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::types::PatcherConfig;
use crate::core::clock::Clock;
use crate::error::{ConfigError, NotFoundError, PatcherError, PatcherResult, ValidationError};
use crate::files::{FileArea, FileStore};
use crate::git::{self, ApplyCommand, GitExecutable};
use crate::store::{Database, NewReport, Operation, Patch, Report};

/// Engine knobs taken from `[patcher]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub git: Option<PathBuf>,
    pub root: PathBuf,
    pub timeout: Duration,
    pub gate_status_on_success: bool,
    pub allow_repeat: bool,
}

impl EngineSettings {
    #[must_use]
    pub fn from_config(config: &PatcherConfig) -> Self {
        Self {
            git: config.git.clone(),
            root: config.root.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            gate_status_on_success: config.gate_status_on_success,
            allow_repeat: config.allow_repeat,
        }
    }
}

/// The patch after the attempt, and the report it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub patch: Patch,
    pub report: Report,
}

/// Result of a `git apply --check` dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub operation: Operation,
    /// Whether the operation would apply cleanly.
    pub applicable: bool,
    pub exit_code: i32,
    pub output: String,
}

/// Runs apply/restore against the application tree.
#[derive(Debug, Clone)]
pub struct OperationEngine {
    db: Database,
    files: FileStore,
    area: FileArea,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
    locks: PatchLocks,
}

impl OperationEngine {
    pub fn new(
        db: Database,
        files: FileStore,
        area: FileArea,
        clock: Arc<dyn Clock>,
        settings: EngineSettings,
        locks: PatchLocks,
    ) -> Self {
        Self {
            db,
            files,
            area,
            clock,
            settings,
            locks,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Parse `action` and run it on `patch_id`.
    ///
    /// # Errors
    ///
    /// See [`Self::perform`]. An empty action is `OperationNotFound`, an
    /// unknown one `InvalidOperation`.
    pub async fn perform_operation(
        &self,
        patch_id: i64,
        action: &str,
    ) -> PatcherResult<OperationOutcome> {
        let operation: Operation = action.parse()?;
        self.perform(patch_id, operation).await
    }

    /// Run `operation` on `patch_id` and record the attempt.
    ///
    /// A failing or timed-out `git apply` still yields `Ok`: the report
    /// carries the exit code and output.
    ///
    /// # Errors
    ///
    /// Returns an error, before any subprocess runs, when git is not
    /// configured, the root is not a directory, the patch or its file is
    /// missing, or the repeat policy rejects the call. Returns `Store` if the
    /// report cannot be written.
    pub async fn perform(
        &self,
        patch_id: i64,
        operation: Operation,
    ) -> PatcherResult<OperationOutcome> {
        let git = GitExecutable::resolve(self.settings.git.as_deref())?;
        let root = self.application_root()?;

        let _guard = self.locks.acquire(patch_id).await;
        debug!(patch_id, operation = %operation, "patch locked");

        let patch = self
            .db
            .get_patch(patch_id)
            .await?
            .ok_or(NotFoundError::Patch { id: patch_id })?;

        if !self.settings.allow_repeat && patch.status == operation.target_status() {
            return Err(ValidationError::RepeatedOperation {
                id: patch_id,
                operation: operation.to_string(),
            }
            .into());
        }

        let blob = self.locate_file(&patch).await?;

        let outcome = ApplyCommand::new(&git, root, &blob, operation)
            .timeout(self.settings.timeout)
            .run()
            .await?;

        let succeeded = outcome.success();
        let flip_status = succeeded || !self.settings.gate_status_on_success;
        if !succeeded && flip_status {
            warn!(
                patch_id,
                operation = %operation,
                exit_code = outcome.exit_code,
                "git apply failed, status updated anyway"
            );
        }

        let (report, updated) = self
            .db
            .record_operation(
                &NewReport {
                    patchid: patch_id,
                    statuscode: i64::from(outcome.exit_code),
                    operation,
                    data: outcome.output,
                    time: self.clock.now(),
                },
                flip_status,
            )
            .await?;

        let patch = match (flip_status, updated) {
            (true, Some(updated)) => updated,
            (true, None) => return Err(NotFoundError::Patch { id: patch_id }.into()),
            (false, _) => patch,
        };

        info!(
            patch_id,
            operation = %operation,
            report_id = report.id,
            exit_code = outcome.exit_code,
            elapsed_ms = outcome.elapsed.as_millis(),
            status = patch.status.label(),
            "operation finished"
        );
        Ok(OperationOutcome { patch, report })
    }

    /// Dry-run `operation` on `patch_id`. Nothing is recorded and the
    /// patch is not locked.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`Self::perform`], minus the repeat policy.
    pub async fn check(&self, patch_id: i64, operation: Operation) -> PatcherResult<CheckOutcome> {
        let git = GitExecutable::resolve(self.settings.git.as_deref())?;
        let root = self.application_root()?;
        let patch = self
            .db
            .get_patch(patch_id)
            .await?
            .ok_or(NotFoundError::Patch { id: patch_id })?;
        let blob = self.locate_file(&patch).await?;

        let outcome =
            git::check(&git, root, &blob, operation, self.settings.timeout).await?;
        debug!(
            patch_id,
            operation = %operation,
            exit_code = outcome.exit_code,
            "check finished"
        );
        Ok(CheckOutcome {
            operation,
            applicable: outcome.success(),
            exit_code: outcome.exit_code,
            output: outcome.output,
        })
    }

    /// The directory `git apply` runs in. Must exist.
    fn application_root(&self) -> Result<&Path, ConfigError> {
        let root = self.settings.root.as_path();
        if root.is_dir() {
            Ok(root)
        } else {
            Err(ConfigError::InvalidValue {
                section: "patcher".to_string(),
                key: "root".to_string(),
                message: format!("'{}' is not a directory", root.display()),
            })
        }
    }

    /// Absolute path of the patch's non-empty stored file.
    async fn locate_file(&self, patch: &Patch) -> PatcherResult<PathBuf> {
        let missing = || -> PatcherError {
            NotFoundError::PatchFile {
                name: patch.name.clone(),
            }
            .into()
        };

        let file = self
            .files
            .get_file(&self.area, patch.id)
            .await?
            .filter(|f| !f.is_empty())
            .ok_or_else(missing)?;

        match self.files.local_path(&file) {
            Ok(path) => Ok(path),
            Err(PatcherError::Fs(_)) => {
                warn!(patch_id = patch.id, hash = %file.contenthash, "stored blob missing on disk");
                Err(missing())
            }
            Err(e) => Err(e),
        }
    }
}

// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Queries on the `patches` table.

use tracing::debug;

use super::models::{NewReport, Operation, Patch, PatchStatus, Report, ReportStatus};
use super::{Database, map_name_conflict};
use crate::error::PatcherResult;

impl Database {
    /// Insert a clean patch with no file bound yet, returning its id.
    ///
    /// # Errors
    ///
    /// `ValidationError::DuplicateName` if the name is taken, `Store` otherwise.
    pub async fn insert_patch(&self, name: &str, now: i64) -> PatcherResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO patches (name, attachments, status, timecreated, timemodified)
            VALUES (?, NULL, ?, ?, ?)
            RETURNING id
            ",
        )
        .bind(name)
        .bind(PatchStatus::Clean)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_name_conflict(e, name))?;

        debug!(patch_id = id, name, "patch inserted");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn get_patch(&self, id: i64) -> PatcherResult<Option<Patch>> {
        let patch = sqlx::query_as::<_, Patch>("SELECT * FROM patches WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(patch)
    }

    /// Whether a patch other than `exclude` already uses `name`.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn patch_name_taken(&self, name: &str, exclude: Option<i64>) -> PatcherResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM patches WHERE name = ? AND id IS NOT ?)",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Rename a patch and bump `timemodified`. Returns false if the id is unknown.
    ///
    /// # Errors
    ///
    /// `ValidationError::DuplicateName` if the name is taken, `Store` otherwise.
    pub async fn rename_patch(&self, id: i64, name: &str, now: i64) -> PatcherResult<bool> {
        let res = sqlx::query("UPDATE patches SET name = ?, timemodified = ? WHERE id = ?")
            .bind(name)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_name_conflict(e, name))?;
        Ok(res.rows_affected() > 0)
    }

    /// Point a patch at its stored file record.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn set_patch_attachment(&self, id: i64, file_id: Option<i64>) -> PatcherResult<()> {
        sqlx::query("UPDATE patches SET attachments = ? WHERE id = ?")
            .bind(file_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Persist the report of one attempt and, when `flip_status` is set, move
    /// the patch to the operation's target status, in one transaction.
    ///
    /// `timemodified` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure; nothing is written in that case.
    pub async fn record_operation(
        &self,
        report: &NewReport,
        flip_status: bool,
    ) -> PatcherResult<(Report, Option<Patch>)> {
        let mut tx = self.pool.begin().await?;

        let saved = sqlx::query_as::<_, Report>(
            r"
            INSERT INTO patch_reports (patchid, statuscode, status, operation, data, timecreated, timemodified)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            ",
        )
        .bind(report.patchid)
        .bind(report.statuscode)
        .bind(ReportStatus::from_exit_code(report.statuscode))
        .bind(report.operation)
        .bind(&report.data)
        .bind(report.time)
        .bind(report.time)
        .fetch_one(&mut *tx)
        .await?;

        let patch = if flip_status {
            let sql = match report.operation {
                Operation::Apply => {
                    "UPDATE patches SET status = ?, timeapplied = ? WHERE id = ? RETURNING *"
                }
                Operation::Restore => {
                    "UPDATE patches SET status = ?, timerestored = ? WHERE id = ? RETURNING *"
                }
            };
            sqlx::query_as::<_, Patch>(sql)
                .bind(report.operation.target_status())
                .bind(report.time)
                .bind(report.patchid)
                .fetch_optional(&mut *tx)
                .await?
        } else {
            None
        };

        tx.commit().await?;

        debug!(
            patch_id = report.patchid,
            report_id = saved.id,
            operation = %report.operation,
            statuscode = report.statuscode,
            flip_status,
            "operation recorded"
        );
        Ok((saved, patch))
    }

    /// Delete a patch and its reports. Returns false if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn delete_patch(&self, id: i64) -> PatcherResult<bool> {
        let mut tx = self.pool.begin().await?;

        let reports = sqlx::query("DELETE FROM patch_reports WHERE patchid = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted = sqlx::query("DELETE FROM patches WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        debug!(patch_id = id, deleted, reports, "patch deleted");
        Ok(deleted > 0)
    }

    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn count_patches(&self) -> PatcherResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patches")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

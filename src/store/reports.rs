// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Queries on the `patch_reports` table. Reports are written by
//! [`Database::record_operation`] only.

use super::Database;
use super::models::Report;
use crate::error::PatcherResult;

impl Database {
    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn get_report(&self, id: i64) -> PatcherResult<Option<Report>> {
        let report = sqlx::query_as::<_, Report>("SELECT * FROM patch_reports WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(report)
    }

    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn count_reports(&self, patchid: i64) -> PatcherResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patch_reports WHERE patchid = ?")
            .bind(patchid)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Delete one report. Returns false if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn delete_report(&self, id: i64) -> PatcherResult<bool> {
        let res = sqlx::query("DELETE FROM patch_reports WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

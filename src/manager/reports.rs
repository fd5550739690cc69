// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::FixedOffset;
use serde::Serialize;
use tracing::info;

use crate::error::{NotFoundError, PatcherResult};
use crate::render::format_date;
use crate::store::Database;

/// Date and captured output of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportInfo {
    pub date: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ReportManager {
    db: Database,
    offset: FixedOffset,
}

impl ReportManager {
    /// Dates are rendered in `offset`.
    #[must_use]
    pub const fn new(db: Database, offset: FixedOffset) -> Self {
        Self { db, offset }
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the report does not exist.
    pub async fn get_report_info(&self, id: i64) -> PatcherResult<ReportInfo> {
        let report = self
            .db
            .get_report(id)
            .await?
            .ok_or(NotFoundError::Report { id })?;
        Ok(ReportInfo {
            date: format_date(Some(report.timecreated), self.offset),
            content: report.data,
        })
    }

    /// Returns false if the report does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn delete_report(&self, id: i64) -> PatcherResult<bool> {
        let deleted = self.db.delete_report(id).await?;
        if deleted {
            info!(report_id = id, "report deleted");
        }
        Ok(deleted)
    }
}

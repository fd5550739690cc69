// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Row types and status enums.
//!
//! ```text
//! PatchStatus:  Clean(0) --apply--> Applied(1)
//!                 |                   ^  |
//!               restore          apply  restore
//!                 v                   |  v
//!               Restored(2) <---------+--+
//!
//! ReportStatus: Success(1) iff statuscode == 0, else Error(0)
//! ```

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Last operation performed on a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum PatchStatus {
    #[default]
    Clean = 0,
    Applied = 1,
    Restored = 2,
}

impl PatchStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clean => "None",
            Self::Applied => "Applied",
            Self::Restored => "Restored",
        }
    }
}

/// Outcome of one apply/restore attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum ReportStatus {
    Error = 0,
    Success = 1,
}

impl ReportStatus {
    /// Success iff the exit code is 0.
    #[must_use]
    pub const fn from_exit_code(code: i64) -> Self {
        if code == 0 { Self::Success } else { Self::Error }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "Successful",
            Self::Error => "Error occurred",
        }
    }
}

/// Patch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Operation {
    Apply,
    Restore,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::Restore => "restore",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Apply => "Apply",
            Self::Restore => "Restore",
        }
    }

    /// Status a patch moves to after this operation.
    #[must_use]
    pub const fn target_status(self) -> PatchStatus {
        match self {
            Self::Apply => PatchStatus::Applied,
            Self::Restore => PatchStatus::Restored,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Err(ValidationError::OperationNotFound),
            "apply" => Ok(Self::Apply),
            "restore" => Ok(Self::Restore),
            _ => Err(ValidationError::InvalidOperation {
                action: s.to_string(),
            }),
        }
    }
}

/// Uploaded patch metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Patch {
    pub id: i64,
    pub name: String,
    /// Id of the bound stored file record.
    pub attachments: Option<i64>,
    pub status: PatchStatus,
    pub timecreated: i64,
    pub timemodified: i64,
    pub timeapplied: Option<i64>,
    pub timerestored: Option<i64>,
}

impl Patch {
    /// Time of the most recent `op`, if it ever ran.
    #[must_use]
    pub const fn last_time_of(&self, op: Operation) -> Option<i64> {
        match op {
            Operation::Apply => self.timeapplied,
            Operation::Restore => self.timerestored,
        }
    }
}

/// Record of one apply/restore attempt. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: i64,
    pub patchid: i64,
    /// Exit code of `git apply`, -1 on timeout.
    pub statuscode: i64,
    pub status: ReportStatus,
    pub operation: Operation,
    /// Captured output lines joined with `\n`.
    pub data: String,
    pub timecreated: i64,
    pub timemodified: i64,
}

/// Insert payload for [`Report`].
#[derive(Debug, Clone)]
pub struct NewReport {
    pub patchid: i64,
    pub statuscode: i64,
    pub operation: Operation,
    pub data: String,
    pub time: i64,
}

/// Stored file record; blob bytes live in the file store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StoredFile {
    pub id: i64,
    pub component: String,
    pub filearea: String,
    pub itemid: i64,
    pub filename: String,
    /// SHA-256 of the content, hex encoded.
    pub contenthash: String,
    pub filesize: i64,
    pub mimetype: String,
    pub timecreated: i64,
}

impl StoredFile {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.filesize == 0
    }
}

/// Insert payload for [`StoredFile`].
#[derive(Debug, Clone)]
pub struct NewStoredFile<'a> {
    pub component: &'a str,
    pub filearea: &'a str,
    pub itemid: i64,
    pub filename: &'a str,
    pub contenthash: &'a str,
    pub filesize: i64,
    pub mimetype: &'a str,
    pub time: i64,
}

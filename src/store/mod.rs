// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Patch record store backed by SQLite.
//!
//! ```text
//! Database::connect(url)
//!   SqliteConnectOptions (create_if_missing, WAL, foreign_keys)
//!   SqlitePool
//!   apply_schema(SQLITE_INIT)
//!        |
//!   +----+-----------+--------------+
//!   |                |              |
//! patches.rs     reports.rs    stored_files.rs
//! patches        patch_reports files
//! ```

pub mod models;
mod patches;
mod reports;
pub mod schema;
mod stored_files;


use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{FsError, PatcherResult, ValidationError};
use schema::SQLITE_INIT;

pub use models::{
    NewReport, NewStoredFile, Operation, Patch, PatchStatus, Report, ReportStatus, StoredFile,
};

/// Handle to the patch database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to a SQLite database URL (`sqlite://path.db`, `sqlite::memory:`),
    /// creating the file and schema if needed.
    ///
    /// # Errors
    ///
    /// Returns `PatcherError::Store` if the URL is invalid or the connection or
    /// schema setup fails.
    pub async fn connect(url: &str) -> PatcherResult<Self> {
        let memory = url.contains(":memory:") || url.contains("mode=memory");
        if !memory && let Some(path) = database_file(url) {
            ensure_parent(path)?;
        }
        let options = SqliteConnectOptions::from_str(url)?;
        Self::connect_with(options, memory).await
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// connection or schema setup fails.
    pub async fn open_path(path: &Path) -> PatcherResult<Self> {
        ensure_parent(path)?;
        Self::connect_with(SqliteConnectOptions::new().filename(path), false).await
    }

    async fn connect_with(options: SqliteConnectOptions, memory: bool) -> PatcherResult<Self> {
        let options = options
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(if memory {
                SqliteJournalMode::Memory
            } else {
                SqliteJournalMode::Wal
            })
            .synchronous(SqliteSynchronous::Normal);

        // Every in-memory connection is its own database.
        let pool_options = if memory {
            SqlitePoolOptions::new().max_connections(1)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options.connect_with(options).await?;
        let db = Self { pool };
        db.apply_schema().await?;

        info!("database initialized");
        Ok(db)
    }

    /// Borrow the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn apply_schema(&self) -> PatcherResult<()> {
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        debug!("schema applied");
        Ok(())
    }
}

/// File path part of a `sqlite:` URL, without query parameters.
fn database_file(url: &str) -> Option<&Path> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty()).then(|| Path::new(path))
}

fn ensure_parent(path: &Path) -> PatcherResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;
    }
    Ok(())
}

/// Map a UNIQUE violation on the patch name to a typed validation error.
fn map_name_conflict(err: sqlx::Error, name: &str) -> crate::error::PatcherError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => ValidationError::DuplicateName {
            name: name.to_string(),
        }
        .into(),
        _ => err.into(),
    }
}

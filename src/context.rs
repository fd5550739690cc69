// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wiring of every collaborator an endpoint needs.
//!
//! ```text
//! Config
//!   |
//!   v
//! PatcherContext::open()
//!   Database ----+-----------------+--------------+
//!   FileStore ---+                 |              |
//!   Clock, PatchLocks              |              |
//!   |            |                 |              |
//!   v            v                 v              v
//! OperationEngine  PatchManager  ReportManager  Renderer
//! ```

use chrono::FixedOffset;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::core::clock::{Clock, SystemClock};
use crate::engine::{EngineSettings, OperationEngine, PatchLocks};
use crate::error::PatcherResult;
use crate::files::{FileArea, FileStore};
use crate::manager::{PatchManager, ReportManager};
use crate::render::Renderer;
use crate::store::Database;

/// Everything the endpoints operate on.
#[derive(Debug)]
pub struct PatcherContext {
    pub db: Database,
    pub files: FileStore,
    pub area: FileArea,
    pub engine: OperationEngine,
    pub patches: PatchManager,
    pub reports: ReportManager,
    pub renderer: Renderer,
}

impl PatcherContext {
    /// Connect to the configured database and file store, on the wall clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the database
    /// cannot be opened.
    pub async fn open(config: &Config) -> PatcherResult<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock)).await
    }

    /// [`Self::open`] with an explicit time source.
    ///
    /// # Errors
    ///
    /// See [`Self::open`].
    pub async fn open_with_clock(config: &Config, clock: Arc<dyn Clock>) -> PatcherResult<Self> {
        let offset = config.patcher.utc_offset()?;
        let db = Database::connect(&config.storage.database).await?;
        let ctx = Self::assemble(config, db, clock, offset)?;
        debug!(
            database = %config.storage.database,
            files = %ctx.files.root().display(),
            "context ready"
        );
        Ok(ctx)
    }

    fn assemble(
        config: &Config,
        db: Database,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> PatcherResult<Self> {
        let files = FileStore::new(&config.storage.files, db.clone());
        let area = FileArea::new(&config.storage.component, &config.storage.filearea);
        let locks = PatchLocks::new();

        let engine = OperationEngine::new(
            db.clone(),
            files.clone(),
            area.clone(),
            clock.clone(),
            EngineSettings::from_config(&config.patcher),
            locks.clone(),
        );
        let patches = PatchManager::new(db.clone(), files.clone(), area.clone(), clock, locks);
        let reports = ReportManager::new(db.clone(), offset);

        Ok(Self {
            db,
            files,
            area,
            engine,
            patches,
            reports,
            renderer: Renderer::new(offset)?,
        })
    }

    /// Close the database pool.
    pub async fn close(&self) {
        self.db.close().await;
    }
}

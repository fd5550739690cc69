// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::clock::Clock;
use crate::engine::PatchLocks;
use crate::error::{NotFoundError, PatcherError, PatcherResult, ValidationError};
use crate::files::{FileArea, FileStore};
use crate::store::{Database, Patch};

/// Upload extensions accepted as patch files.
const PATCH_EXTENSIONS: &[&str] = &["diff", "patch"];

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.content.is_empty() {
            return Err(ValidationError::FileRequired);
        }
        if std::str::from_utf8(&self.content).is_err() {
            return Err(ValidationError::InvalidEncoding {
                filename: self.filename.clone(),
            });
        }
        let supported = Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                PATCH_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            });
        if supported {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedFileType {
                filename: self.filename.clone(),
            })
        }
    }
}

/// Upload payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatch {
    pub name: String,
    pub filename: String,
    pub content: Vec<u8>,
}

/// Edit payload: new name and, optionally, a replacement file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchUpdate {
    pub id: i64,
    pub name: String,
    pub file: Option<UploadedFile>,
}

/// Name and file content of a patch. Uploads are UTF-8 only, so the
/// content is byte-identical to what was uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchInfo {
    pub name: String,
    pub content: String,
}

fn validate_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        Err(ValidationError::NameRequired)
    } else {
        Ok(name)
    }
}

#[derive(Debug, Clone)]
pub struct PatchManager {
    db: Database,
    files: FileStore,
    area: FileArea,
    clock: Arc<dyn Clock>,
    locks: PatchLocks,
}

impl PatchManager {
    pub fn new(
        db: Database,
        files: FileStore,
        area: FileArea,
        clock: Arc<dyn Clock>,
        locks: PatchLocks,
    ) -> Self {
        Self {
            db,
            files,
            area,
            clock,
            locks,
        }
    }

    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn get_patch(&self, id: i64) -> PatcherResult<Option<Patch>> {
        self.db.get_patch(id).await
    }

    /// Insert a CLEAN patch and bind its file. Returns the new id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name, an empty or
    /// unsupported file, or a name already in use.
    pub async fn create_patch(&self, new: NewPatch) -> PatcherResult<i64> {
        let name = validate_name(&new.name)?;
        let file = UploadedFile::new(new.filename, new.content);
        file.validate()?;
        if self.db.patch_name_taken(name, None).await? {
            return Err(ValidationError::DuplicateName {
                name: name.to_string(),
            }
            .into());
        }

        let now = self.clock.now();
        let id = self.db.insert_patch(name, now).await?;

        if let Err(e) = self.bind_file(id, file, now).await {
            warn!(patch_id = id, error = %e, "file upload failed, dropping patch");
            self.db.delete_patch(id).await?;
            return Err(e);
        }

        info!(patch_id = id, name, "patch created");
        Ok(id)
    }

    /// Rename a patch and optionally replace its file. Returns false if the
    /// patch does not exist.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name, a name used by another
    /// patch, or an empty or unsupported replacement file.
    pub async fn update_patch(&self, update: PatchUpdate) -> PatcherResult<bool> {
        let name = validate_name(&update.name)?;
        if let Some(file) = &update.file {
            file.validate()?;
        }

        let _guard = self.locks.acquire(update.id).await;
        if self.db.get_patch(update.id).await?.is_none() {
            return Ok(false);
        }
        if self.db.patch_name_taken(name, Some(update.id)).await? {
            return Err(ValidationError::DuplicateName {
                name: name.to_string(),
            }
            .into());
        }

        // File first: a failed upload must leave the name untouched.
        let now = self.clock.now();
        if let Some(file) = update.file {
            self.bind_file(update.id, file, now).await?;
        }
        if !self.db.rename_patch(update.id, name, now).await? {
            return Ok(false);
        }

        info!(patch_id = update.id, name, "patch updated");
        Ok(true)
    }

    async fn bind_file(&self, id: i64, file: UploadedFile, now: i64) -> PatcherResult<()> {
        let stored = self
            .files
            .store(&self.area, id, &file.filename, file.content, now)
            .await?;
        self.db.set_patch_attachment(id, Some(stored.id)).await
    }

    /// Name and content. Blobs written before the UTF-8 upload check have
    /// invalid sequences replaced.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the patch or its file is missing.
    pub async fn get_patch_info(&self, id: i64) -> PatcherResult<PatchInfo> {
        let patch = self
            .db
            .get_patch(id)
            .await?
            .ok_or(NotFoundError::Patch { id })?;
        let missing = || -> PatcherError {
            NotFoundError::PatchFile {
                name: patch.name.clone(),
            }
            .into()
        };

        let file = self
            .files
            .get_file(&self.area, id)
            .await?
            .ok_or_else(missing)?;
        let content = match self.files.read(&file).await {
            Ok(bytes) => bytes,
            Err(PatcherError::Fs(_)) => return Err(missing()),
            Err(e) => return Err(e),
        };

        Ok(PatchInfo {
            content: String::from_utf8_lossy(&content).into_owned(),
            name: patch.name,
        })
    }

    /// Delete a patch, its reports and its file. Returns false if absent.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure or `Fs` if the blob cannot be removed.
    pub async fn delete_patch(&self, id: i64) -> PatcherResult<bool> {
        let guard = self.locks.acquire(id).await;
        if !self.db.delete_patch(id).await? {
            return Ok(false);
        }
        self.files.delete_item(&self.area, id).await?;
        drop(guard);
        self.locks.forget(id);

        info!(patch_id = id, "patch deleted");
        Ok(true)
    }
}

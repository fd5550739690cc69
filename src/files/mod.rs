// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content-addressed file store for uploaded patch files.
//!
//! ```text
//! store(area, itemid, filename, bytes)
//!   sha256(bytes) -> <root>/ab/cd/abcd…   (written once, atomically)
//!   files row (component, filearea, itemid) -> contenthash
//!   old blob removed when no row references it
//!
//! delete_item(area, itemid)
//!   drop row, then blob if unreferenced
//! ```
//!
//! Identical uploads share one blob.


use sha2::{Digest, Sha256};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{FsError, PatcherError, PatcherResult};
use crate::store::{Database, NewStoredFile, StoredFile};

/// Component and file area owning a set of stored files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArea {
    pub component: String,
    pub filearea: String,
}

impl FileArea {
    pub fn new(component: impl Into<String>, filearea: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            filearea: filearea.into(),
        }
    }
}

/// Blob directory plus the `files` table that indexes it.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    db: Database,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>, db: Database) -> Self {
        Self {
            root: root.into(),
            db,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `content` as the single file of (area, itemid), replacing any
    /// previous one.
    ///
    /// # Errors
    ///
    /// Returns `Fs` if the blob cannot be written, `Store` on database failure.
    pub async fn store(
        &self,
        area: &FileArea,
        itemid: i64,
        filename: &str,
        content: Vec<u8>,
        now: i64,
    ) -> PatcherResult<StoredFile> {
        let contenthash = hex::encode(Sha256::digest(&content));
        let filesize = i64::try_from(content.len())
            .map_err(|_| PatcherError::Other("file too large".into()))?;

        let path = self.blob_path(&contenthash);
        write_blob(path, content).await?;

        let (record, previous) = self
            .db
            .put_file_record(&NewStoredFile {
                component: &area.component,
                filearea: &area.filearea,
                itemid,
                filename,
                contenthash: &contenthash,
                filesize,
                mimetype: mimetype_for(filename),
                time: now,
            })
            .await?;

        if let Some(previous) = previous
            && previous != contenthash
        {
            self.release_blob(&previous).await?;
        }

        debug!(
            component = %area.component,
            filearea = %area.filearea,
            itemid,
            filename,
            filesize,
            hash = %contenthash,
            "file stored"
        );
        Ok(record)
    }

    /// The file record of (area, itemid), if any.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn get_file(&self, area: &FileArea, itemid: i64) -> PatcherResult<Option<StoredFile>> {
        self.db
            .get_file_record(&area.component, &area.filearea, itemid)
            .await
    }

    /// Where the blob for `contenthash` lives: `<root>/<h0h1>/<h2h3>/<hash>`.
    #[must_use]
    pub fn blob_path(&self, contenthash: &str) -> PathBuf {
        let (l1, l2) = match (contenthash.get(0..2), contenthash.get(2..4)) {
            (Some(a), Some(b)) => (a, b),
            _ => ("00", "00"),
        };
        self.root.join(l1).join(l2).join(contenthash)
    }

    /// Absolute path of a stored file's blob.
    ///
    /// # Errors
    ///
    /// Returns `FsError::NotFound` if the blob is missing on disk.
    pub fn local_path(&self, file: &StoredFile) -> PatcherResult<PathBuf> {
        let path = self.blob_path(&file.contenthash);
        let path = std::path::absolute(&path).map_err(|e| FsError::io(&path, e))?;
        if !path.is_file() {
            return Err(FsError::NotFound(path.display().to_string()).into());
        }
        Ok(path)
    }

    /// Read a stored file's content.
    ///
    /// # Errors
    ///
    /// Returns `Fs` if the blob is missing or unreadable.
    pub async fn read(&self, file: &StoredFile) -> PatcherResult<Vec<u8>> {
        let path = self.blob_path(&file.contenthash);
        tokio::fs::read(&path)
            .await
            .map_err(|e| FsError::io(&path, e).into())
    }

    /// Delete the file of (area, itemid). Returns false if there was none.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure or `Fs` if the blob cannot be removed.
    pub async fn delete_item(&self, area: &FileArea, itemid: i64) -> PatcherResult<bool> {
        let Some(record) = self
            .db
            .delete_file_record(&area.component, &area.filearea, itemid)
            .await?
        else {
            return Ok(false);
        };
        self.release_blob(&record.contenthash).await?;
        debug!(itemid, hash = %record.contenthash, "file deleted");
        Ok(true)
    }

    /// Number of files in an area.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn count_area(&self, area: &FileArea) -> PatcherResult<i64> {
        self.db
            .count_area_files(&area.component, &area.filearea)
            .await
    }

    /// Remove a blob once no record points at it.
    async fn release_blob(&self, contenthash: &str) -> PatcherResult<()> {
        if self.db.count_blob_refs(contenthash).await? > 0 {
            return Ok(());
        }
        let path = self.blob_path(contenthash);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "blob already gone");
                Ok(())
            }
            Err(e) => Err(FsError::io(&path, e).into()),
        }
    }
}

/// Write a blob through a temp file in the target directory, skipping the
/// write when the blob already exists.
async fn write_blob(path: PathBuf, content: Vec<u8>) -> PatcherResult<()> {
    tokio::task::spawn_blocking(move || -> Result<(), FsError> {
        if path.is_file() {
            return Ok(());
        }
        let dir = path
            .parent()
            .ok_or_else(|| FsError::NotFound(path.display().to_string()))?;
        std::fs::create_dir_all(dir).map_err(|e| FsError::io(dir, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| FsError::io(dir, e))?;
        tmp.write_all(&content).map_err(|e| FsError::io(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| FsError::io(&path, e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| PatcherError::Other(format!("blob writer task failed: {e}").into()))??;
    Ok(())
}

fn mimetype_for(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("diff") => "text/x-diff",
        Some("patch") => "text/x-patch",
        _ => "application/octet-stream",
    }
}

// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Queries on the `files` table.

use super::Database;
use super::models::{NewStoredFile, StoredFile};
use crate::error::PatcherResult;

impl Database {
    /// Bind a file to (component, area, item), replacing any previous record.
    ///
    /// Returns the new record and the content hash of the replaced one, if any.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn put_file_record(
        &self,
        file: &NewStoredFile<'_>,
    ) -> PatcherResult<(StoredFile, Option<String>)> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<String> = sqlx::query_scalar(
            "SELECT contenthash FROM files WHERE component = ? AND filearea = ? AND itemid = ?",
        )
        .bind(file.component)
        .bind(file.filearea)
        .bind(file.itemid)
        .fetch_optional(&mut *tx)
        .await?;

        let record = sqlx::query_as::<_, StoredFile>(
            r"
            INSERT INTO files (component, filearea, itemid, filename, contenthash, filesize, mimetype, timecreated)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(component, filearea, itemid) DO UPDATE SET
                filename = excluded.filename,
                contenthash = excluded.contenthash,
                filesize = excluded.filesize,
                mimetype = excluded.mimetype,
                timecreated = excluded.timecreated
            RETURNING *
            ",
        )
        .bind(file.component)
        .bind(file.filearea)
        .bind(file.itemid)
        .bind(file.filename)
        .bind(file.contenthash)
        .bind(file.filesize)
        .bind(file.mimetype)
        .bind(file.time)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((record, previous))
    }

    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn get_file_record(
        &self,
        component: &str,
        filearea: &str,
        itemid: i64,
    ) -> PatcherResult<Option<StoredFile>> {
        let record = sqlx::query_as::<_, StoredFile>(
            "SELECT * FROM files WHERE component = ? AND filearea = ? AND itemid = ?",
        )
        .bind(component)
        .bind(filearea)
        .bind(itemid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Remove the record for (component, area, item), returning it if one existed.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn delete_file_record(
        &self,
        component: &str,
        filearea: &str,
        itemid: i64,
    ) -> PatcherResult<Option<StoredFile>> {
        let record = sqlx::query_as::<_, StoredFile>(
            "DELETE FROM files WHERE component = ? AND filearea = ? AND itemid = ? RETURNING *",
        )
        .bind(component)
        .bind(filearea)
        .bind(itemid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Number of records sharing a blob.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn count_blob_refs(&self, contenthash: &str) -> PatcherResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE contenthash = ?")
            .bind(contenthash)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of records in a file area.
    ///
    /// # Errors
    ///
    /// Returns `Store` on database failure.
    pub async fn count_area_files(&self, component: &str, filearea: &str) -> PatcherResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE component = ? AND filearea = ?")
                .bind(component)
                .bind(filearea)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
